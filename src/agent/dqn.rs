use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::{DqnError, Result};
use crate::loss::{HuberLoss, Loss};
use crate::network::{Gradients, NeuralNetwork, ParameterSnapshot, ValueEstimator};
use crate::observation::{Observation, ObservationShape};
use crate::optimizer::{Adam, GradientClipper, OptimizerWrapper, SGD};
use crate::replay_buffer::{ReplayBuffer, Transition};

/// Which network evaluates the greedy branch of epsilon-greedy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionNetwork {
    /// The network being trained (conventional DQN).
    #[default]
    Policy,
    /// The periodically synchronized snapshot.
    Target,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

/// Summary of one learning step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainReport {
    pub loss: f32,
    /// Largest absolute gradient component before clipping.
    pub max_grad_before_clip: f32,
    /// Largest absolute gradient component handed to the optimizer.
    pub max_grad_applied: f32,
}

/// Deep Q-Network agent: a policy network trained by gradient descent and a
/// target network that only ever changes through [`DqnAgent::sync_target`].
///
/// # Example
///
/// ```rust
/// use polecart::agent::DqnAgentBuilder;
/// use polecart::observation::ObservationShape;
///
/// let shape = ObservationShape::new(4, 8, 8);
/// let mut agent = DqnAgentBuilder::new(shape, 2)
///     .hidden_layers(&[32])
///     .gamma(0.98)
///     .seed(7)
///     .build()
///     .unwrap();
///
/// let observation = shape.zeros();
/// let action = agent.act(&observation, 0.1).unwrap();
/// assert!(action < 2);
/// ```
pub struct DqnAgent {
    policy_network: NeuralNetwork,
    target_network: NeuralNetwork,
    optimizer: OptimizerWrapper,
    clipper: GradientClipper,
    loss: HuberLoss,
    shape: ObservationShape,
    pub gamma: f32,
    pub learning_rate: f32,
    pub action_network: ActionNetwork,
    /// Number of learning steps applied to the policy network
    pub train_steps: usize,
    rng: StdRng,
}

impl DqnAgent {
    pub fn policy(&self) -> &NeuralNetwork {
        &self.policy_network
    }

    pub fn target(&self) -> &NeuralNetwork {
        &self.target_network
    }

    pub fn observation_shape(&self) -> ObservationShape {
        self.shape
    }

    pub fn num_actions(&self) -> usize {
        self.policy_network.num_actions()
    }

    /// Value estimates of the network selected by `action_network`.
    pub fn q_values(&self, observation: &Observation) -> Result<Array1<f32>> {
        let input = self.shape.flatten_batch([observation])?;
        let network: &dyn ValueEstimator = match self.action_network {
            ActionNetwork::Policy => &self.policy_network,
            ActionNetwork::Target => &self.target_network,
        };
        Ok(network.forward_batch(input.view()).index_axis_move(Axis(0), 0))
    }

    /// Greedy action; ties go to the lowest index.
    pub fn greedy_action(&self, observation: &Observation) -> Result<usize> {
        let q_values = self.q_values(observation)?;
        argmax(q_values.iter().copied())
            .ok_or_else(|| DqnError::NumericalError("no finite Q-values to choose from".to_string()))
    }

    /// Epsilon-greedy action selection. Never touches network parameters.
    pub fn act(&mut self, observation: &Observation, epsilon: f32) -> Result<usize> {
        let r: f32 = self.rng.gen();
        if r > epsilon {
            self.greedy_action(observation)
        } else {
            Ok(self.rng.gen_range(0..self.num_actions()))
        }
    }

    /// Huber loss of a batch and its gradients with respect to the policy
    /// parameters. Nothing is updated.
    pub fn compute_gradients(&self, batch: &[&Transition]) -> Result<(f32, Gradients)> {
        if batch.is_empty() {
            return Err(DqnError::invalid_parameter("batch", "cannot learn from an empty batch"));
        }

        let states = self.shape.flatten_batch(batch.iter().map(|t| &t.state))?;
        let next_states = self.shape.flatten_batch(batch.iter().map(|t| &t.next_state))?;
        if states.ncols() != self.policy_network.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("{} network inputs", self.policy_network.input_size()),
                format!("{} observation values", states.ncols()),
            ));
        }

        let actions: Vec<usize> = batch.iter().map(|t| t.action).collect();
        let rewards: Array1<f32> = batch.iter().map(|t| t.reward).collect();
        let dones: Vec<bool> = batch.iter().map(|t| t.done).collect();

        let (q_all, caches) = self.policy_network.forward_cached(states.view());
        let predicted = gather(&q_all, &actions)?;

        let next_values = bootstrap_values(&self.target_network, next_states.view(), &dones);
        let targets = &rewards + &(next_values * self.gamma);

        let loss = self.loss.compute(predicted.view(), targets.view());
        let d_predicted = self.loss.gradient(predicted.view(), targets.view());

        // Only the taken action's output receives an error signal.
        let mut output_errors = Array2::zeros(q_all.dim());
        for (row, (&action, &grad)) in actions.iter().zip(d_predicted.iter()).enumerate() {
            output_errors[[row, action]] = grad;
        }

        let gradients = self.policy_network.backward(&caches, output_errors.view());
        Ok((loss, gradients))
    }

    /// One optimizer step on the policy network from `batch`.
    pub fn train_on_batch(&mut self, batch: &[&Transition]) -> Result<TrainReport> {
        let (loss, mut gradients) = self.compute_gradients(batch)?;

        if !loss.is_finite() || !gradients.is_finite() {
            return Err(DqnError::NumericalError(format!(
                "non-finite loss or gradients at learning step {} (loss = {})",
                self.train_steps, loss
            )));
        }

        let max_grad_before_clip = gradients.max_abs();
        self.clipper.clip(&mut gradients);
        let max_grad_applied = gradients.max_abs();

        self.policy_network.apply_gradients(&gradients, &mut self.optimizer, self.learning_rate);
        self.train_steps += 1;

        debug!(step = self.train_steps, loss, max_grad_before_clip, "learning step");

        Ok(TrainReport { loss, max_grad_before_clip, max_grad_applied })
    }

    /// Sample a minibatch and learn from it, or do nothing while the buffer
    /// holds fewer than `batch_size` transitions.
    pub fn learn(&mut self, buffer: &mut ReplayBuffer, batch_size: usize) -> Result<Option<TrainReport>> {
        if buffer.len() < batch_size {
            return Ok(None);
        }
        let batch = buffer.sample(batch_size)?;
        self.train_on_batch(&batch).map(Some)
    }

    /// Overwrite every target parameter with the current policy parameter.
    pub fn sync_target(&mut self) -> Result<()> {
        let snapshot = self.policy_network.parameters();
        self.target_network.set_parameters(&snapshot)
    }

    /// Load pretrained parameters into the policy and copy them to the target.
    pub fn load_parameters(&mut self, snapshot: &ParameterSnapshot) -> Result<()> {
        self.policy_network.set_parameters(snapshot)?;
        self.sync_target()
    }
}

/// Max target-network value of each next state, or exactly zero where the
/// transition ended the episode. The target network is evaluated only on the
/// non-terminal rows.
pub fn bootstrap_values<V: ValueEstimator + ?Sized>(target: &V, next_states: ArrayView2<f32>, dones: &[bool]) -> Array1<f32> {
    let mut values = Array1::zeros(dones.len());
    let live: Vec<usize> = dones
        .iter()
        .enumerate()
        .filter_map(|(i, &done)| (!done).then_some(i))
        .collect();

    if live.is_empty() {
        return values;
    }

    let live_states = next_states.select(Axis(0), &live);
    let q_next = target.forward_batch(live_states.view());
    for (row, &i) in live.iter().enumerate() {
        values[i] = q_next.row(row).iter().fold(f32::NEG_INFINITY, |max, &v| max.max(v));
    }
    values
}

/// Pick `q[row, actions[row]]` for every row.
pub fn gather(q: &Array2<f32>, actions: &[usize]) -> Result<Array1<f32>> {
    let num_actions = q.ncols();
    actions
        .iter()
        .enumerate()
        .map(|(row, &action)| {
            if action >= num_actions {
                Err(DqnError::InvalidAction { action, num_actions })
            } else {
                Ok(q[[row, action]])
            }
        })
        .collect()
}

fn argmax(values: impl Iterator<Item = f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, v) in values.enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Builder pattern for DqnAgent
pub struct DqnAgentBuilder {
    shape: ObservationShape,
    num_actions: usize,
    hidden_layers: Vec<usize>,
    gamma: f32,
    learning_rate: f32,
    optimizer: OptimizerKind,
    grad_clip: Option<f32>,
    huber_delta: f32,
    action_network: ActionNetwork,
    networks: Option<(NeuralNetwork, NeuralNetwork)>,
    seed: Option<u64>,
}

impl DqnAgentBuilder {
    pub fn new(shape: ObservationShape, num_actions: usize) -> Self {
        DqnAgentBuilder {
            shape,
            num_actions,
            hidden_layers: vec![256],
            gamma: 0.98,
            learning_rate: 1e-3,
            optimizer: OptimizerKind::Adam,
            grad_clip: Some(1.0),
            huber_delta: 1.0,
            action_network: ActionNetwork::Policy,
            networks: None,
            seed: None,
        }
    }

    pub fn hidden_layers(mut self, sizes: &[usize]) -> Self {
        self.hidden_layers = sizes.to_vec();
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Component-wise gradient clip bound; `None` disables clipping.
    pub fn grad_clip(mut self, limit: Option<f32>) -> Self {
        self.grad_clip = limit;
        self
    }

    pub fn huber_delta(mut self, delta: f32) -> Self {
        self.huber_delta = delta;
        self
    }

    pub fn action_network(mut self, network: ActionNetwork) -> Self {
        self.action_network = network;
        self
    }

    /// Use explicit policy and target networks instead of fresh ones.
    pub fn networks(mut self, policy: NeuralNetwork, target: NeuralNetwork) -> Self {
        self.networks = Some((policy, target));
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<DqnAgent> {
        if !(self.gamma > 0.0 && self.gamma < 1.0) {
            return Err(DqnError::invalid_parameter("gamma", "must lie in (0, 1)"));
        }
        if !(self.learning_rate > 0.0) {
            return Err(DqnError::invalid_parameter("learning_rate", "must be positive"));
        }
        if !(self.huber_delta.is_finite() && self.huber_delta > 0.0) {
            return Err(DqnError::invalid_parameter("huber_delta", "must be finite and positive"));
        }
        if let Some(limit) = self.grad_clip {
            if !(limit > 0.0) {
                return Err(DqnError::invalid_parameter("grad_clip", "must be positive"));
            }
        }

        let (policy_network, target_network) = match self.networks {
            Some((policy, target)) => (policy, target),
            None => {
                let policy = NeuralNetwork::q_network(self.shape.flat_len(), &self.hidden_layers, self.num_actions)?;
                // Independent deep copy: the two networks never share storage.
                let target = policy.clone();
                (policy, target)
            }
        };

        for network in [&policy_network, &target_network] {
            if network.input_size() != self.shape.flat_len() || network.num_actions() != self.num_actions {
                return Err(DqnError::dimension_mismatch(
                    format!("{} inputs -> {} actions", self.shape.flat_len(), self.num_actions),
                    format!("{} inputs -> {} actions", network.input_size(), network.num_actions()),
                ));
            }
        }
        if policy_network.parameters().num_parameters() != target_network.parameters().num_parameters() {
            return Err(DqnError::dimension_mismatch(
                "target network structured like the policy network",
                "networks of different structure",
            ));
        }

        let optimizer = match self.optimizer {
            OptimizerKind::Adam => OptimizerWrapper::Adam(Adam::default(&policy_network.layers)),
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new()),
        };
        let clipper = self.grad_clip.map_or(GradientClipper::None, GradientClipper::by_value);
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(DqnAgent {
            policy_network,
            target_network,
            optimizer,
            clipper,
            loss: HuberLoss::new(self.huber_delta),
            shape: self.shape,
            gamma: self.gamma,
            learning_rate: self.learning_rate,
            action_network: self.action_network,
            train_steps: 0,
            rng,
        })
    }
}
