use std::time::{Duration, Instant};

/// Caller-supplied limit for cancellable traversals.
///
/// Checked between node visits; when exhausted the traversal stops and
/// reports truncation instead of failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalBudget {
    pub max_steps: Option<usize>,
    pub deadline: Option<Instant>,
}

impl TraversalBudget {
    /// No step or time limit. Depth bounds still apply.
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn steps(max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
            deadline: None,
        }
    }

    pub fn until(deadline: Instant) -> Self {
        Self {
            max_steps: None,
            deadline: Some(deadline),
        }
    }

    pub fn within(timeout: Duration) -> Self {
        Self::until(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn meter(&self) -> BudgetMeter {
        BudgetMeter {
            budget: *self,
            steps: 0,
            exhausted: false,
        }
    }
}

/// Running counter for one traversal.
#[derive(Clone, Debug)]
pub struct BudgetMeter {
    budget: TraversalBudget,
    steps: usize,
    exhausted: bool,
}

impl BudgetMeter {
    /// Charge one step. Returns `false` once the budget is spent; stays spent.
    pub fn tick(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if let Some(max) = self.budget.max_steps {
            if self.steps >= max {
                self.exhausted = true;
                return false;
            }
        }
        if let Some(deadline) = self.budget.deadline {
            if Instant::now() >= deadline {
                self.exhausted = true;
                return false;
            }
        }
        self.steps += 1;
        true
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
