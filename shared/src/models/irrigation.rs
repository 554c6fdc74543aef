//! Irrigation advisory models and calculation
//!
//! The advisory multiplies a crop's base daily water need by soil,
//! temperature and humidity factors, deducts the rain that already fell and
//! classifies the remainder into an irrigation frequency. Every lookup has a
//! documented fallback so the calculation always produces a result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{lenient_decimal, round_dp};

/// Base need used for crops not in the table (L/m² per day)
pub fn default_base_water_need() -> Decimal {
    Decimal::new(50, 1)
}

/// Soil factor used for soils not in the table
pub fn default_soil_factor() -> Decimal {
    Decimal::ONE
}

/// Temperature assumed when the caller does not supply one (°C)
pub fn default_temperature() -> Decimal {
    Decimal::from(25)
}

/// Humidity assumed when the caller does not supply one (%)
pub fn default_humidity() -> Decimal {
    Decimal::from(50)
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Crops with a known daily water requirement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Maize,
    Beans,
    Tomatoes,
    Cabbage,
    Potatoes,
    Wheat,
    Rice,
    Vegetables,
    Fruits,
}

impl CropType {
    pub const ALL: [CropType; 9] = [
        CropType::Maize,
        CropType::Beans,
        CropType::Tomatoes,
        CropType::Cabbage,
        CropType::Potatoes,
        CropType::Wheat,
        CropType::Rice,
        CropType::Vegetables,
        CropType::Fruits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Maize => "maize",
            CropType::Beans => "beans",
            CropType::Tomatoes => "tomatoes",
            CropType::Cabbage => "cabbage",
            CropType::Potatoes => "potatoes",
            CropType::Wheat => "wheat",
            CropType::Rice => "rice",
            CropType::Vegetables => "vegetables",
            CropType::Fruits => "fruits",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = normalize(name);
        Self::ALL.into_iter().find(|crop| crop.as_str() == name)
    }

    /// Daily water requirement in liters per square meter
    pub fn base_water_need(&self) -> Decimal {
        match self {
            CropType::Maize => Decimal::new(50, 1),
            CropType::Beans => Decimal::new(40, 1),
            CropType::Tomatoes => Decimal::new(60, 1),
            CropType::Cabbage => Decimal::new(55, 1),
            CropType::Potatoes => Decimal::new(50, 1),
            CropType::Wheat => Decimal::new(45, 1),
            CropType::Rice => Decimal::new(70, 1),
            CropType::Vegetables => Decimal::new(50, 1),
            CropType::Fruits => Decimal::new(60, 1),
        }
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Soils with a known water-retention multiplier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SoilType {
    Sandy,
    Loamy,
    Clay,
    Silt,
}

impl SoilType {
    pub const ALL: [SoilType; 4] = [SoilType::Sandy, SoilType::Loamy, SoilType::Clay, SoilType::Silt];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Sandy => "sandy",
            SoilType::Loamy => "loamy",
            SoilType::Clay => "clay",
            SoilType::Silt => "silt",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = normalize(name);
        Self::ALL.into_iter().find(|soil| soil.as_str() == name)
    }

    /// Sandy soil drains fast and needs more water; clay holds it
    pub fn water_factor(&self) -> Decimal {
        match self {
            SoilType::Sandy => Decimal::new(13, 1),
            SoilType::Loamy => Decimal::new(10, 1),
            SoilType::Clay => Decimal::new(8, 1),
            SoilType::Silt => Decimal::new(9, 1),
        }
    }

    fn caution(&self) -> Option<&'static str> {
        match self {
            SoilType::Sandy => Some("Sandy soil drains quickly - monitor soil moisture regularly. "),
            SoilType::Clay => Some(
                "Clay soil retains moisture well - avoid overwatering to prevent waterlogging. ",
            ),
            SoilType::Loamy | SoilType::Silt => None,
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Base need for a crop name, falling back to 5.0 L/m² for unknown crops
pub fn base_water_need(crop_type: &str) -> Decimal {
    CropType::from_name(crop_type)
        .map(|crop| crop.base_water_need())
        .unwrap_or_else(default_base_water_need)
}

/// Soil factor for a soil name, falling back to 1.0 for unknown soils
pub fn soil_factor(soil_type: &str) -> Decimal {
    SoilType::from_name(soil_type)
        .map(|soil| soil.water_factor())
        .unwrap_or_else(default_soil_factor)
}

/// Temperature tiers. Bounds are strict: 30 is `Warm`, 25 and 15 are `Mild`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    /// Above 30°C
    Hot,
    /// Above 25°C up to 30°C
    Warm,
    /// 15°C to 25°C
    Mild,
    /// Below 15°C
    Cool,
}

impl TemperatureBand {
    pub fn classify(temperature: Decimal) -> Self {
        if temperature > Decimal::from(30) {
            TemperatureBand::Hot
        } else if temperature > Decimal::from(25) {
            TemperatureBand::Warm
        } else if temperature < Decimal::from(15) {
            TemperatureBand::Cool
        } else {
            TemperatureBand::Mild
        }
    }

    pub fn factor(&self) -> Decimal {
        match self {
            TemperatureBand::Hot => Decimal::new(130, 2),
            TemperatureBand::Warm => Decimal::new(115, 2),
            TemperatureBand::Mild => Decimal::ONE,
            TemperatureBand::Cool => Decimal::new(80, 2),
        }
    }
}

/// Humidity tiers. Bounds are strict: 40 and 70 are `Moderate`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HumidityBand {
    /// Below 40%
    Dry,
    /// 40% to 70%
    Moderate,
    /// Above 70%
    Humid,
}

impl HumidityBand {
    pub fn classify(humidity: Decimal) -> Self {
        if humidity < Decimal::from(40) {
            HumidityBand::Dry
        } else if humidity > Decimal::from(70) {
            HumidityBand::Humid
        } else {
            HumidityBand::Moderate
        }
    }

    pub fn factor(&self) -> Decimal {
        match self {
            HumidityBand::Dry => Decimal::new(120, 2),
            HumidityBand::Moderate => Decimal::ONE,
            HumidityBand::Humid => Decimal::new(85, 2),
        }
    }
}

/// Multiplier applied to the base need for a temperature in °C
pub fn temperature_factor(temperature: Decimal) -> Decimal {
    TemperatureBand::classify(temperature).factor()
}

/// Multiplier applied to the base need for a relative humidity in %
pub fn humidity_factor(humidity: Decimal) -> Decimal {
    HumidityBand::classify(humidity).factor()
}

/// How often to irrigate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IrrigationFrequency {
    #[serde(rename = "every 2-3 days")]
    EveryTwoToThreeDays,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "twice daily")]
    TwiceDaily,
}

impl IrrigationFrequency {
    /// Below 2 L/m² every 2-3 days, above 7 L/m² twice daily, daily otherwise
    pub fn classify(water_amount: Decimal) -> Self {
        if water_amount < Decimal::from(2) {
            IrrigationFrequency::EveryTwoToThreeDays
        } else if water_amount > Decimal::from(7) {
            IrrigationFrequency::TwiceDaily
        } else {
            IrrigationFrequency::Daily
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IrrigationFrequency::EveryTwoToThreeDays => "every 2-3 days",
            IrrigationFrequency::Daily => "daily",
            IrrigationFrequency::TwiceDaily => "twice daily",
        }
    }
}

impl std::fmt::Display for IrrigationFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Advisory request as received from a client.
///
/// Numeric fields are optional and lenient: missing or unparseable values
/// fall back to 25°C, 50% and 0 mm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisoryInput {
    #[serde(default)]
    pub crop_type: String,
    #[serde(default)]
    pub soil_type: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub temperature: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub humidity: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub rainfall: Option<Decimal>,
}

impl AdvisoryInput {
    pub fn temperature_or_default(&self) -> Decimal {
        self.temperature.unwrap_or_else(default_temperature)
    }

    pub fn humidity_or_default(&self) -> Decimal {
        self.humidity.unwrap_or_else(default_humidity)
    }

    /// Rainfall cannot be negative; anything below zero counts as none
    pub fn rainfall_or_default(&self) -> Decimal {
        self.rainfall.unwrap_or(Decimal::ZERO).max(Decimal::ZERO)
    }

    /// Run the advisory with defaults applied
    pub fn compute(&self) -> IrrigationResult {
        compute_advisory(
            &self.crop_type,
            &self.soil_type,
            self.temperature_or_default(),
            self.humidity_or_default(),
            self.rainfall_or_default(),
        )
    }
}

/// Unrounded intermediate figures of one advisory
#[derive(Debug, Clone, PartialEq)]
pub struct WaterCalculation {
    pub crop: Option<CropType>,
    pub soil: Option<SoilType>,
    pub base_need: Decimal,
    pub soil_factor: Decimal,
    pub temperature_band: TemperatureBand,
    pub humidity_band: HumidityBand,
    /// base need × soil × temperature × humidity factors
    pub raw_water: Decimal,
    /// Raw water less rainfall, never below zero
    pub adjusted_water: Decimal,
    pub frequency: IrrigationFrequency,
}

/// Compute the water figures without rounding or text
pub fn calculate_water_need(
    crop_type: &str,
    soil_type: &str,
    temperature: Decimal,
    humidity: Decimal,
    rainfall: Decimal,
) -> WaterCalculation {
    let crop = CropType::from_name(crop_type);
    let soil = SoilType::from_name(soil_type);
    let base_need = crop
        .map(|c| c.base_water_need())
        .unwrap_or_else(default_base_water_need);
    let soil_factor = soil
        .map(|s| s.water_factor())
        .unwrap_or_else(default_soil_factor);
    let temperature_band = TemperatureBand::classify(temperature);
    let humidity_band = HumidityBand::classify(humidity);

    let raw_water = base_need * soil_factor * temperature_band.factor() * humidity_band.factor();
    // Rainfall far below zero saturates rather than overflowing
    let adjusted_water = raw_water
        .checked_sub(rainfall)
        .unwrap_or(Decimal::MAX)
        .max(Decimal::ZERO);

    WaterCalculation {
        crop,
        soil,
        base_need,
        soil_factor,
        temperature_band,
        humidity_band,
        raw_water,
        adjusted_water,
        frequency: IrrigationFrequency::classify(adjusted_water),
    }
}

/// Contributing factors of an advisory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactorBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub base_need: Decimal,
    /// Raw table value, not rounded
    #[serde(with = "rust_decimal::serde::float")]
    pub soil_factor: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub temp_factor: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub humidity_factor: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rainfall_deduction: Decimal,
}

/// Irrigation advisory for one request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IrrigationResult {
    /// Recommended volume in L/m², rounded to 2 decimals
    #[serde(with = "rust_decimal::serde::float")]
    pub water_amount: Decimal,
    pub frequency: IrrigationFrequency,
    pub recommendation: String,
    pub details: FactorBreakdown,
}

/// Compute an irrigation advisory from crop, soil and weather.
///
/// Never fails: unknown crops and soils use their table defaults.
pub fn compute_advisory(
    crop_type: &str,
    soil_type: &str,
    temperature: Decimal,
    humidity: Decimal,
    rainfall: Decimal,
) -> IrrigationResult {
    let calculation = calculate_water_need(crop_type, soil_type, temperature, humidity, rainfall);
    let water_amount = round_dp(calculation.adjusted_water, 2);
    let recommendation = build_recommendation(&calculation, water_amount);

    IrrigationResult {
        water_amount,
        frequency: calculation.frequency,
        recommendation,
        details: FactorBreakdown {
            base_need: round_dp(calculation.base_need, 2),
            soil_factor: calculation.soil_factor,
            temp_factor: round_dp(calculation.temperature_band.factor(), 2),
            humidity_factor: round_dp(calculation.humidity_band.factor(), 2),
            rainfall_deduction: round_dp(rainfall, 2),
        },
    }
}

fn build_recommendation(calculation: &WaterCalculation, water_amount: Decimal) -> String {
    let shown = water_amount.normalize();
    // Tier follows the amount shown, so the text never says "approximately 0"
    let mut text = if water_amount.is_zero() {
        "No irrigation needed today due to sufficient rainfall. ".to_string()
    } else if water_amount < Decimal::from(2) {
        format!(
            "Light irrigation recommended. Apply approximately {} liters per square meter. ",
            shown
        )
    } else if water_amount < Decimal::from(5) {
        format!(
            "Moderate irrigation needed. Apply approximately {} liters per square meter. ",
            shown
        )
    } else {
        format!(
            "Heavy irrigation required. Apply approximately {} liters per square meter. ",
            shown
        )
    };

    text.push_str(&format!("Irrigation frequency: {}. ", calculation.frequency));

    if calculation.temperature_band == TemperatureBand::Hot {
        text.push_str(
            "High temperature detected - consider irrigating during early morning or evening to reduce evaporation. ",
        );
    }

    if calculation.humidity_band == HumidityBand::Dry {
        text.push_str("Low humidity levels may increase water loss through evaporation. ");
    }

    if let Some(caution) = calculation.soil.and_then(|s| s.caution()) {
        text.push_str(caution);
    }

    text.trim_end().to_string()
}
