//! Temperature thresholds and the color states they select.
//!
//! A [`ThresholdTable`] is built once from configuration and is immutable
//! afterwards. Every lookup against it is total: building is the only place
//! where a missing color or an empty table is reported.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, anyhow, bail};

use crate::config::{FALLBACK_TEMP, Led};

/// Named LED configuration for one temperature bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorState {
    /// Color name, also used to detect state changes.
    pub name: String,

    /// Inclusive upper temperature bound of the bucket in °C.
    pub max_temp: i32,

    /// LED assignments applied in order.
    pub leds: Vec<Led>,
}

impl ColorState {
    /// An unset state never reaches the hardware.
    pub fn is_unset(&self) -> bool {
        self.name.is_empty()
    }
}

/// Ascending list of temperature buckets plus the fallback state.
///
/// # Example
///
/// ```
/// use std::collections::{BTreeMap, HashMap};
/// use templed::config::Led;
/// use templed::thresholds::ThresholdTable;
///
/// let colors = HashMap::from([
///     ("off".to_string(), vec![Led::new("led:red", 0)]),
///     ("hot".to_string(), vec![Led::new("led:red", 1)]),
/// ]);
/// let temps = BTreeMap::from([(0, "off".to_string()), (70, "hot".to_string())]);
///
/// let table = ThresholdTable::build(&temps, &colors)?;
/// assert_eq!(table.resolve(85.0).name, "hot");
/// assert_eq!(table.fallback().name, "off");
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    buckets: Vec<ColorState>,
    fallback: ColorState,
}

impl ThresholdTable {
    /// Builds the table from threshold and color definitions.
    ///
    /// The [`FALLBACK_TEMP`] entry becomes the fallback state. Without it
    /// the fallback is unset and will never be applied.
    pub fn build(
        temps: &BTreeMap<i32, String>,
        colors: &HashMap<String, Vec<Led>>,
    ) -> Result<Self> {
        let mut buckets = Vec::with_capacity(temps.len());
        let mut fallback = ColorState::default();

        for (&temp, color_name) in temps {
            let leds = colors
                .get(color_name)
                .ok_or_else(|| anyhow!("unknown color {color_name:?} for temp {temp}"))?;

            let state = ColorState {
                name: color_name.clone(),
                max_temp: temp,
                leds: leds.clone(),
            };

            if temp == FALLBACK_TEMP {
                fallback = state;
                continue;
            }

            buckets.push(state);
        }
        buckets.sort_by_key(|state| state.max_temp);

        if buckets.is_empty() {
            bail!("no temps configured");
        }

        Ok(Self { buckets, fallback })
    }

    /// Selects the color state for a temperature reading.
    ///
    /// Returns the first bucket whose bound is not below the truncated
    /// temperature. Readings above every bound land in the hottest bucket.
    pub fn resolve(&self, temp: f32) -> &ColorState {
        let temp = temp as i32;
        self.buckets
            .iter()
            .find(|state| temp <= state.max_temp)
            .or_else(|| self.buckets.last())
            .unwrap_or(&self.fallback)
    }

    /// State used when the sensor is unreadable and on shutdown.
    pub fn fallback(&self) -> &ColorState {
        &self.fallback
    }

    /// Temperature buckets in ascending order.
    pub fn buckets(&self) -> &[ColorState] {
        &self.buckets
    }
}
