use crate::utils::error::Result;
use crate::utils::validation::{validate_unit_factor, validate_unit_name};
use serde::{Deserialize, Serialize};

/// A named length unit, described by how many millimetres one of it holds.
///
/// Every conversion goes through millimetres, so a unit only has to know its
/// own factor to be convertible to every other unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    name: String,
    millimetres: f64,
}

impl Unit {
    pub fn new(name: impl Into<String>, millimetres: f64) -> Result<Self> {
        let name = name.into();
        validate_unit_name("unit name", &name)?;
        validate_unit_factor(&name, millimetres)?;
        Ok(Self { name, millimetres })
    }

    /// 內建單位表用，跳過驗證
    pub(crate) fn builtin(name: &str, millimetres: f64) -> Self {
        Self {
            name: name.to_string(),
            millimetres,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn millimetres(&self) -> f64 {
        self.millimetres
    }

    pub fn to_millimetres(&self, value: f64) -> f64 {
        self.millimetres * value
    }

    pub fn from_millimetres(&self, mm: f64) -> f64 {
        mm / self.millimetres
    }

    pub fn convert_to(&self, value: f64, to: &Unit) -> f64 {
        to.from_millimetres(self.to_millimetres(value))
    }
}

/// 設定檔裡的單位定義 (`[[units]]` / `[[catalog.units]]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub name: String,
    pub millimetres: f64,
}

impl TryFrom<&UnitDefinition> for Unit {
    type Error = crate::utils::error::ConvertError;

    fn try_from(def: &UnitDefinition) -> Result<Self> {
        Unit::new(def.name.clone(), def.millimetres)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centimetre_to_and_from_millimetres() {
        let cm = Unit::new("cm", 10.0).unwrap();
        assert_eq!(cm.to_millimetres(1.0), 10.0);
        assert_eq!(cm.from_millimetres(250.0), 25.0);
    }

    #[test]
    fn test_metre_to_and_from_millimetres() {
        let m = Unit::new("m", 1000.0).unwrap();
        assert_eq!(m.to_millimetres(4.5), 4500.0);
        assert_eq!(m.from_millimetres(3600.0), 3.6);
    }

    #[test]
    fn test_convert_to_same_unit_is_identity() {
        let from = Unit::new("cm", 10.0).unwrap();
        let to = Unit::new("cm", 10.0).unwrap();
        assert_eq!(from.convert_to(3.142, &to), 3.142);
    }

    #[test]
    fn test_rejects_bad_definitions() {
        assert!(Unit::new("", 1.0).is_err());
        assert!(Unit::new("nautical mile", 1_852_000.0).is_err());
        assert!(Unit::new("zero", 0.0).is_err());

        let def = UnitDefinition {
            name: "ch".to_string(),
            millimetres: 20116.8,
        };
        let unit = Unit::try_from(&def).unwrap();
        assert_eq!(unit.name(), "ch");
        assert_eq!(unit.millimetres(), 20116.8);
    }
}
