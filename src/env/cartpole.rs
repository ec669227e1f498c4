use std::collections::BTreeMap;

use ndarray::{array, Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

use super::{Environment, Render, StepOutcome};
use crate::error::{DqnError, Result};
use crate::observation::Frame;

/// Physical constants of the cart-pole system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CartPoleParams {
    pub gravity: f32,
    pub mass_cart: f32,
    pub mass_pole: f32,
    /// Half the pole length.
    pub length: f32,
    pub force_mag: f32,
    pub tau: f32,
    pub x_threshold: f32,
    pub theta_threshold: f32,
}

impl Default for CartPoleParams {
    fn default() -> Self {
        CartPoleParams {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length: 0.5,
            force_mag: 10.0,
            tau: 0.02,
            x_threshold: 2.4,
            theta_threshold: 12.0_f32.to_radians(),
        }
    }
}

/// Classic pole balancing: push the cart left (0) or right (1); reward 1 per
/// step until the pole falls past 12 degrees or the cart leaves the track.
pub struct CartPole {
    pub params: CartPoleParams,
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,
    done: bool,
    rng: StdRng,
}

impl CartPole {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        CartPole {
            params: CartPoleParams::default(),
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            done: true,
            rng,
        }
    }

    pub fn state(&self) -> Array1<f32> {
        array![self.x, self.x_dot, self.theta, self.theta_dot]
    }

    fn out_of_bounds(&self) -> bool {
        self.x.abs() > self.params.x_threshold || self.theta.abs() > self.params.theta_threshold
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    fn reset(&mut self) -> Array1<f32> {
        let init = Uniform::new(-0.05_f32, 0.05);
        self.x = init.sample(&mut self.rng);
        self.x_dot = init.sample(&mut self.rng);
        self.theta = init.sample(&mut self.rng);
        self.theta_dot = init.sample(&mut self.rng);
        self.done = false;
        self.state()
    }

    fn step(&mut self, action: usize) -> Result<StepOutcome> {
        if action >= self.num_actions() {
            return Err(DqnError::InvalidAction { action, num_actions: self.num_actions() });
        }

        if self.done {
            return Ok(StepOutcome {
                observation: self.state(),
                reward: 0.0,
                done: true,
                info: BTreeMap::new(),
            });
        }

        let p = self.params;
        let force = if action == 1 { p.force_mag } else { -p.force_mag };
        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();
        let total_mass = p.mass_cart + p.mass_pole;
        let pole_mass_length = p.mass_pole * p.length;

        let temp = (force + pole_mass_length * self.theta_dot * self.theta_dot * sin_theta) / total_mass;
        let theta_acc = (p.gravity * sin_theta - cos_theta * temp)
            / (p.length * (4.0 / 3.0 - p.mass_pole * cos_theta * cos_theta / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // Explicit Euler
        self.x += p.tau * self.x_dot;
        self.x_dot += p.tau * x_acc;
        self.theta += p.tau * self.theta_dot;
        self.theta_dot += p.tau * theta_acc;

        self.done = self.out_of_bounds();

        let mut info = BTreeMap::new();
        info.insert("x".to_string(), self.x);
        info.insert("theta".to_string(), self.theta);

        Ok(StepOutcome {
            observation: self.state(),
            reward: 1.0,
            done: self.done,
            info,
        })
    }

    fn num_actions(&self) -> usize {
        2
    }
}

impl Render for CartPole {
    /// Cart as a filled box on a track, pole as a line from the cart's top.
    fn render(&self, height: usize, width: usize) -> Frame {
        let mut frame = Array2::zeros((height, width));
        if height == 0 || width == 0 {
            return frame;
        }

        let world_width = 2.0 * self.params.x_threshold;
        let scale = width as f32 / world_width;
        let cart_center = (self.x + self.params.x_threshold) * scale;
        let cart_half_width = (width as f32 / 20.0).max(1.0);
        let cart_top = (height as f32 * 0.7) as isize;
        let cart_bottom = (height as f32 * 0.8) as isize;

        let mut plot = |row: isize, col: isize| {
            if row >= 0 && col >= 0 && (row as usize) < height && (col as usize) < width {
                frame[[row as usize, col as usize]] = 1.0;
            }
        };

        let left = (cart_center - cart_half_width).round() as isize;
        let right = (cart_center + cart_half_width).round() as isize;
        for row in cart_top..=cart_bottom {
            for col in left..=right {
                plot(row, col);
            }
        }

        // Pole drawn pointing up at theta = 0.
        let pole_len = 2.0 * self.params.length * scale;
        let samples = (pole_len.ceil() as usize).max(2) * 2;
        for i in 0..=samples {
            let t = i as f32 / samples as f32;
            let col = cart_center + t * pole_len * self.theta.sin();
            let row = cart_top as f32 - t * pole_len * self.theta.cos();
            plot(row.round() as isize, col.round() as isize);
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_ends_when_pole_falls() {
        let mut env = CartPole::with_seed(3);
        env.reset();
        let mut steps = 0;
        loop {
            let outcome = env.step(1).unwrap();
            steps += 1;
            assert_eq!(outcome.reward, 1.0);
            if outcome.done {
                break;
            }
            assert!(steps < 500, "always pushing right must topple the pole");
        }
        assert!(steps > 1);
    }

    #[test]
    fn test_invalid_action() {
        let mut env = CartPole::with_seed(0);
        env.reset();
        assert!(matches!(env.step(2), Err(DqnError::InvalidAction { action: 2, num_actions: 2 })));
    }

    #[test]
    fn test_render_is_binary_and_nonempty() {
        let mut env = CartPole::with_seed(1);
        env.reset();
        let frame = env.render(40, 80);
        assert_eq!(frame.dim(), (40, 80));
        assert!(frame.iter().all(|&v| v == 0.0 || v == 1.0));
        assert!(frame.sum() > 0.0);
    }
}
