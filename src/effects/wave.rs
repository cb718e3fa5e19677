use serde::{Deserialize, Serialize};

use crate::error::FxError;

use super::{Effect, EffectContext, EffectOutput};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Peak displacement in columns.
    pub amplitude: f64,
    /// Phase step between consecutive lines.
    pub frequency: f64,
    /// Phase advance per millisecond.
    pub speed: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            amplitude: 3.0,
            frequency: 0.8,
            speed: 0.002,
        }
    }
}

/// Horizontal sine displacement per line.
///
/// Lines move by whole columns so the character grid of ASCII art stays
/// intact: a rightward shift pads with spaces, a leftward shift only eats
/// leading spaces that are already there.
pub struct Wave {
    config: WaveConfig,
}

impl Wave {
    pub fn new(config: WaveConfig) -> Self {
        Self { config }
    }
}

impl Effect for Wave {
    fn name(&self) -> &str {
        "wave"
    }

    fn render(
        &mut self,
        text: &str,
        elapsed: f64,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        let phase = elapsed * self.config.speed;

        let out = text
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                let shift =
                    ((i as f64 * self.config.frequency + phase).sin() * self.config.amplitude).round() as i64;
                if shift > 0 {
                    format!("{}{}", " ".repeat(shift as usize), line)
                } else if shift < 0 {
                    let leading = line.len() - line.trim_start_matches(' ').len();
                    let cut = leading.min(shift.unsigned_abs() as usize);
                    line[cut..].to_string()
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(EffectOutput::Plain(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BufferSurface;
    use crate::types::Extent;

    fn render(wave: &mut Wave, text: &str, elapsed: f64) -> String {
        let mut surface = BufferSurface::new(Extent::new(16, 4));
        let mut ctx = EffectContext {
            original: text,
            surface: &mut surface,
        };
        wave.render(text, elapsed, &mut ctx).unwrap().text().to_string()
    }

    #[test]
    fn zero_amplitude_is_identity() {
        let mut wave = Wave::new(WaveConfig {
            amplitude: 0.0,
            ..WaveConfig::default()
        });
        assert_eq!(render(&mut wave, "AB\nCD", 1234.0), "AB\nCD");
    }

    #[test]
    fn shifts_follow_the_sine() {
        // frequency = pi/2 puts line 1 at the crest and line 3 at the trough.
        let mut wave = Wave::new(WaveConfig {
            amplitude: 2.0,
            frequency: std::f64::consts::FRAC_PI_2,
            speed: 0.0,
        });
        let out = render(&mut wave, "a\nb\nc\n   d", 0.0);
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines[0], "a");
        assert_eq!(lines[1], "  b");
        assert_eq!(lines[2], "c");
        assert_eq!(lines[3], " d");
    }

    #[test]
    fn left_shift_never_eats_glyphs() {
        let mut wave = Wave::new(WaveConfig {
            amplitude: 3.0,
            frequency: 0.0,
            speed: 1.0,
        });
        // sin(3pi/2) = -1: a three column pull with only one leading space.
        let t = 3.0 * std::f64::consts::FRAC_PI_2;
        assert_eq!(render(&mut wave, " xy", t), "xy");
        assert_eq!(render(&mut wave, "xy", t), "xy");
    }
}
