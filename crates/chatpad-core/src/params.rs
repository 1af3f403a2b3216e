use serde::{Deserialize, Serialize};

pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);
pub const MAX_TOKENS_RANGE: (u32, u32) = (100, 4096);
pub const CONTEXT_LENGTH_RANGE: (usize, usize) = (1, 10);

/// Sampling and history-window controls for one request.
///
/// The core takes these as given. Range checks belong to whoever collects them
/// from the user, which is what [`RequestParameters::clamped`] is for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Number of prior user/assistant pairs sent with each request.
    pub context_length: usize,
}

impl Default for RequestParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            context_length: 2,
        }
    }
}

impl RequestParameters {
    pub fn clamped(self) -> Self {
        Self {
            temperature: self.temperature.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1),
            max_tokens: self.max_tokens.clamp(MAX_TOKENS_RANGE.0, MAX_TOKENS_RANGE.1),
            context_length: self
                .context_length
                .clamp(CONTEXT_LENGTH_RANGE.0, CONTEXT_LENGTH_RANGE.1),
        }
    }

    /// Step temperature by tenths, rounding away float drift.
    pub fn step_temperature(&mut self, up: bool) {
        let delta = if up { 0.1 } else { -0.1 };
        let next = ((self.temperature + delta) * 10.0).round() / 10.0;
        self.temperature = next.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1);
    }

    pub fn step_max_tokens(&mut self, delta: i64) {
        let next = (self.max_tokens as i64 + delta)
            .clamp(MAX_TOKENS_RANGE.0 as i64, MAX_TOKENS_RANGE.1 as i64);
        self.max_tokens = next as u32;
    }

    pub fn step_context_length(&mut self, up: bool) {
        let next = if up {
            self.context_length.saturating_add(1)
        } else {
            self.context_length.saturating_sub(1)
        };
        self.context_length = next.clamp(CONTEXT_LENGTH_RANGE.0, CONTEXT_LENGTH_RANGE.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = RequestParameters::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_tokens, 1000);
        assert_eq!(params.context_length, 2);
    }

    #[test]
    fn test_clamped() {
        let params = RequestParameters {
            temperature: 3.5,
            max_tokens: 10,
            context_length: 0,
        }
        .clamped();
        assert_eq!(params.temperature, 2.0);
        assert_eq!(params.max_tokens, 100);
        assert_eq!(params.context_length, 1);
    }

    #[test]
    fn test_steps_stop_at_bounds() {
        let mut params = RequestParameters::default();
        for _ in 0..30 {
            params.step_temperature(true);
            params.step_context_length(true);
            params.step_max_tokens(500);
        }
        assert_eq!(params.temperature, 2.0);
        assert_eq!(params.context_length, 10);
        assert_eq!(params.max_tokens, 4096);

        params.step_temperature(false);
        assert_eq!(params.temperature, 1.9);
    }
}
