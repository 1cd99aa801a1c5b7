use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Weight unit of measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "LBS")]
    Lbs,
    #[serde(rename = "KGS")]
    Kgs,
}

impl WeightUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lbs => "LBS",
            Self::Kgs => "KGS",
        }
    }
}

/// Dimension unit of measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionUnit {
    #[default]
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "CM")]
    Cm,
}

impl DimensionUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Cm => "CM",
        }
    }
}

/// Package length, width and height, present only as a complete triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// A single parcel in a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub weight: f64,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub dimension_unit: DimensionUnit,
}

impl Package {
    pub fn new(weight: f64, weight_unit: WeightUnit) -> Result<Self, ValidationError> {
        Ok(Self {
            weight: positive("weight", weight)?,
            weight_unit,
            length: None,
            width: None,
            height: None,
            dimension_unit: DimensionUnit::default(),
        })
    }

    pub fn with_dimensions(
        mut self,
        length: f64,
        width: f64,
        height: f64,
        unit: DimensionUnit,
    ) -> Result<Self, ValidationError> {
        self.length = Some(positive("length", length)?);
        self.width = Some(positive("width", width)?);
        self.height = Some(positive("height", height)?);
        self.dimension_unit = unit;
        Ok(self)
    }

    /// Returns the dimensions only when all three are present.
    pub fn dimensions(&self) -> Option<Dimensions> {
        match (self.length, self.width, self.height) {
            (Some(length), Some(width), Some(height)) => Some(Dimensions {
                length,
                width,
                height,
            }),
            _ => None,
        }
    }

    /// True when some but not all of length/width/height are set.
    pub fn has_partial_dimensions(&self) -> bool {
        let present = [self.length, self.width, self.height]
            .iter()
            .filter(|value| value.is_some())
            .count();
        present != 0 && present != 3
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(value)
}
