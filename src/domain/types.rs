//! Shared types for ShopSense

/// Kind of people-counting sensor installed at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorType {
    Thermal,
    Silhouette,
    Infrared,
}

impl SensorType {
    /// Every sensor kind, in the order a tracker installs them
    pub const ALL: [SensorType; 3] = [SensorType::Thermal, SensorType::Silhouette, SensorType::Infrared];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Thermal => "thermal",
            SensorType::Silhouette => "silhouette",
            SensorType::Infrared => "infrared",
        }
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SensorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "thermal" => Ok(SensorType::Thermal),
            "silhouette" => Ok(SensorType::Silhouette),
            "infrared" => Ok(SensorType::Infrared),
            other => Err(format!("unknown sensor type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_type_from_str() {
        assert_eq!("thermal".parse::<SensorType>().unwrap(), SensorType::Thermal);
        assert_eq!("SILHOUETTE".parse::<SensorType>().unwrap(), SensorType::Silhouette);
        assert_eq!("infrared".parse::<SensorType>().unwrap(), SensorType::Infrared);
        assert!("lidar".parse::<SensorType>().is_err());
    }

    #[test]
    fn test_sensor_type_display_matches_as_str() {
        for kind in SensorType::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }
}
