/// Sliding-window memory of past exchanges for the chain variant.
///
/// Every exchange is kept; only the last `k` are rendered into the prompt, so
/// raising `k` later brings older exchanges back into view.
#[derive(Debug, Clone)]
pub struct WindowMemory {
    k: usize,
    exchanges: Vec<(String, String)>,
}

impl WindowMemory {
    pub fn new(k: usize) -> Self {
        Self { k, exchanges: Vec::new() }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn set_k(&mut self, k: usize) {
        self.k = k;
    }

    pub fn save(&mut self, human: impl Into<String>, ai: impl Into<String>) {
        self.exchanges.push((human.into(), ai.into()));
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn window(&self) -> &[(String, String)] {
        let start = self.exchanges.len().saturating_sub(self.k);
        &self.exchanges[start..]
    }

    pub fn render(&self) -> String {
        self.window()
            .iter()
            .map(|(human, ai)| format!("Human: {}\nAI: {}", human, ai))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for WindowMemory {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_only_last_k() {
        let mut memory = WindowMemory::new(2);
        memory.save("one", "1");
        memory.save("two", "2");
        memory.save("three", "3");

        assert_eq!(memory.render(), "Human: two\nAI: 2\nHuman: three\nAI: 3");
    }

    #[test]
    fn test_raising_k_restores_older_exchanges() {
        let mut memory = WindowMemory::new(1);
        memory.save("one", "1");
        memory.save("two", "2");
        assert_eq!(memory.window().len(), 1);

        memory.set_k(5);
        assert_eq!(memory.window().len(), 2);
    }

    #[test]
    fn test_k_zero_renders_nothing() {
        let mut memory = WindowMemory::new(0);
        memory.save("one", "1");
        assert_eq!(memory.render(), "");
    }

    #[test]
    fn test_clear() {
        let mut memory = WindowMemory::default();
        memory.save("one", "1");
        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.render(), "");
    }
}
