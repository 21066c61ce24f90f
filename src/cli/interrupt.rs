//! Ctrl+C handling at the input prompt.

/// Tracks Ctrl+C presses at the prompt: the first one arms, the second one
/// exits. Any submitted line disarms.
#[derive(Debug, Default)]
pub struct PromptInterrupt {
    armed: bool,
}

impl PromptInterrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a Ctrl+C at the prompt. Returns `true` when the driver should exit.
    pub fn interrupt(&mut self) -> bool {
        if self.armed {
            return true;
        }
        self.armed = true;
        false
    }

    /// Input arrived, so the next Ctrl+C starts over.
    pub fn reset(&mut self) {
        self.armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_interrupt_exits() {
        let mut prompt = PromptInterrupt::new();
        assert!(!prompt.interrupt());
        assert!(prompt.interrupt());
    }

    #[test]
    fn test_input_between_interrupts_disarms() {
        let mut prompt = PromptInterrupt::new();
        assert!(!prompt.interrupt());
        prompt.reset();
        assert!(!prompt.interrupt());
        assert!(prompt.interrupt());
    }
}
