use serde::{Deserialize, Serialize};

/// Bandas del ecualizador (32 Hz a 16 kHz)
const BAND_COUNT: usize = 10;

/// Rango de ganancia permitido por banda (dB)
const GAIN_RANGE: (f32, f32) = (-12.0, 12.0);

/// Snapshot de las bandas del ecualizador de una sesión.
///
/// Es lo único que se persiste cuando la sesión se cierra por errores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqualizerBands {
    gains: [f32; BAND_COUNT],
}

impl EqualizerBands {
    pub fn new(gains: [f32; BAND_COUNT]) -> Self {
        let mut bands = Self::flat();
        for (band, gain) in gains.into_iter().enumerate() {
            bands.set_band(band, gain);
        }
        bands
    }

    pub fn flat() -> Self {
        Self { gains: [0.0; BAND_COUNT] }
    }

    /// Ajusta una banda, recortando la ganancia al rango válido
    fn set_band(&mut self, band: usize, gain: f32) {
        if let Some(slot) = self.gains.get_mut(band) {
            *slot = gain.clamp(GAIN_RANGE.0, GAIN_RANGE.1);
        }
    }

    pub fn gains(&self) -> &[f32; BAND_COUNT] {
        &self.gains
    }
}

impl Default for EqualizerBands {
    fn default() -> Self {
        Self::flat()
    }
}
