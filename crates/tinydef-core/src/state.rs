//! Table-driven state machine dispatcher.
//!
//! Each state has optional enter, update and exit handlers. Handlers receive
//! the machine itself (to request transitions with [`StateMachine::goto`])
//! and a caller-supplied context.
//!
//! One [`StateMachine::update`] call runs, in order:
//!
//! 1. enter of the pending state, then the global enter hook, if a
//!    transition is pending or an enter was signalled;
//! 2. update of the current state;
//! 3. exit of the current state, then the global exit hook, if the update
//!    requested a transition or an exit was signalled.
//!
//! A transition requested during frame `n` therefore exits the old state
//! in frame `n` and enters the new one in frame `n + 1`.

use tracing::trace;

/// Handler signature: the machine and the caller's context.
pub type StateFn<C, const N: usize> = fn(&mut StateMachine<C, N>, &mut C);

/// Enter, update and exit handlers of one state.
pub struct StateHandlers<C, const N: usize> {
    /// Runs once when the state becomes current.
    pub enter: Option<StateFn<C, N>>,
    /// Runs every frame while the state is current.
    pub update: Option<StateFn<C, N>>,
    /// Runs in the frame that leaves the state.
    pub exit: Option<StateFn<C, N>>,
}

impl<C, const N: usize> Default for StateHandlers<C, N> {
    fn default() -> Self {
        Self {
            enter: None,
            update: None,
            exit: None,
        }
    }
}

impl<C, const N: usize> Clone for StateHandlers<C, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, const N: usize> Copy for StateHandlers<C, N> {}

/// A state machine over `N` states numbered `0..N`, starting in state 0.
///
/// The initial state's enter handler does not run unless
/// [`signal_enter`](Self::signal_enter) is called before the first update.
pub struct StateMachine<C, const N: usize> {
    previous: usize,
    state: usize,
    next: usize,
    signal_enter: bool,
    signal_exit: bool,
    table: [StateHandlers<C, N>; N],
    on_enter: Option<StateFn<C, N>>,
    on_exit: Option<StateFn<C, N>>,
}

impl<C, const N: usize> StateMachine<C, N> {
    const NON_EMPTY: () = assert!(N > 0, "a state machine needs at least one state");

    /// A machine in state 0 with no handlers.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            previous: 0,
            state: 0,
            next: 0,
            signal_enter: false,
            signal_exit: false,
            table: std::array::from_fn(|_| StateHandlers::default()),
            on_enter: None,
            on_exit: None,
        }
    }

    /// Install the handlers of `state`. Returns `false` for an unknown state.
    pub fn set_handlers(&mut self, state: usize, handlers: StateHandlers<C, N>) -> bool {
        match self.table.get_mut(state) {
            Some(slot) => {
                *slot = handlers;
                true
            }
            None => false,
        }
    }

    /// Builder form of [`set_handlers`](Self::set_handlers).
    ///
    /// # Panics
    ///
    /// Panics if `state >= N`.
    pub fn with_state(mut self, state: usize, handlers: StateHandlers<C, N>) -> Self {
        assert!(self.set_handlers(state, handlers), "state {state} out of range for {N} states");
        self
    }

    /// Hook run after every state's enter handler.
    pub fn set_global_enter(&mut self, hook: Option<StateFn<C, N>>) {
        self.on_enter = hook;
    }

    /// Hook run after every state's exit handler.
    pub fn set_global_exit(&mut self, hook: Option<StateFn<C, N>>) {
        self.on_exit = hook;
    }

    /// Request a transition to `state`. Returns `false` (and changes
    /// nothing) for an unknown state.
    pub fn goto(&mut self, state: usize) -> bool {
        if state >= N {
            return false;
        }
        self.next = state;
        true
    }

    /// Re-run the enter handler of the pending state on the next update.
    pub fn signal_enter(&mut self) {
        self.signal_enter = true;
    }

    /// Run the current state's exit handler at the end of the next update.
    pub fn signal_exit(&mut self) {
        self.signal_exit = true;
    }

    /// The current state.
    pub fn state(&self) -> usize {
        self.state
    }

    /// The state before the last transition.
    pub fn previous(&self) -> usize {
        self.previous
    }

    /// The state the machine will enter on the next update.
    pub fn next_state(&self) -> usize {
        self.next
    }

    /// Advance one frame.
    pub fn update(&mut self, ctx: &mut C) {
        if self.next != self.state || self.signal_enter {
            let entering = self.next;
            if let Some(enter) = self.table[entering].enter {
                enter(self, ctx);
            }
            if let Some(hook) = self.on_enter {
                hook(self, ctx);
            }
            self.signal_enter = false;
            self.previous = self.state;
            self.state = entering;
            trace!(from = self.previous, to = self.state, "state entered");
        }

        if let Some(update) = self.table[self.state].update {
            update(self, ctx);
        }

        if self.next != self.state || self.signal_exit {
            if let Some(exit) = self.table[self.state].exit {
                exit(self, ctx);
            }
            if let Some(hook) = self.on_exit {
                hook(self, ctx);
            }
            self.signal_exit = false;
        }
    }
}

impl<C, const N: usize> Default for StateMachine<C, N> {
    fn default() -> Self {
        Self::new()
    }
}
