/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent
/// and a finite state space and action space. Rewards are not part of the transition:
/// an environment reports an outcome tag and the driving loop decides what it is worth.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State: Copy;

    /// A representation of an action that an agent can take to affect the environment
    type Action: Copy;

    /// Classification of the result of a transition
    type Outcome: Copy;

    /// The current state
    fn state(&self) -> Self::State;

    /// Determine if the state is active or terminal
    fn is_active(&self) -> bool;

    /// Update the environment in response to an action taken by an agent
    ///
    /// **Returns** `(next_state, outcome)`
    fn step(&mut self, action: Self::Action) -> (Self::State, Self::Outcome);

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;
}
