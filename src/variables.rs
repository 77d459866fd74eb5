use std::collections::BTreeMap;

use serde::Serialize;

/// Where the verification tool looks for a field in the forecast files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldSource {
    ShortName(&'static str),
    Grib {
        #[serde(rename = "parameterCategory")]
        parameter_category: u32,
        #[serde(rename = "parameterNumber")]
        parameter_number: u32,
    },
}

/// A single source, or candidates tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldSelector {
    Single(FieldSource),
    Candidates(Vec<FieldSource>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Postprocess {
    #[serde(rename = "tp_deode")]
    TotalPrecipitation,
    #[serde(rename = "None")]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VariableSpec {
    Field {
        var: FieldSelector,
        accum: bool,
        verif_0h: bool,
        postprocess: Postprocess,
        find_min: bool,
    },
    Coordinate {
        var: &'static str,
        description: &'static str,
    },
}

/// Variables the experiment document declares, keyed by verification name.
pub fn verification_variables() -> BTreeMap<&'static str, VariableSpec> {
    BTreeMap::from([
        (
            "pcp",
            VariableSpec::Field {
                var: FieldSelector::Candidates(vec![
                    FieldSource::ShortName("tirf"),
                    FieldSource::Grib {
                        parameter_category: 1,
                        parameter_number: 75,
                    },
                    FieldSource::ShortName("sprate"),
                ]),
                accum: true,
                verif_0h: false,
                postprocess: Postprocess::TotalPrecipitation,
                find_min: false,
            },
        ),
        (
            "rain",
            VariableSpec::Field {
                var: FieldSelector::Single(FieldSource::ShortName("tirf")),
                accum: true,
                verif_0h: false,
                postprocess: Postprocess::None,
                find_min: false,
            },
        ),
        (
            "lat",
            VariableSpec::Coordinate {
                var: "lat",
                description: "latitude coordinates in degrees",
            },
        ),
        (
            "lon",
            VariableSpec::Coordinate {
                var: "lon",
                description: "longitude coordinates in degrees",
            },
        ),
    ])
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::*;

    #[test]
    fn yaml_shape_matches_consumer_layout() {
        let value = serde_yaml::to_value(verification_variables()).unwrap();

        let pcp_var = &value["pcp"]["var"];
        assert_eq!(pcp_var[0], Value::from("tirf"));
        assert_eq!(pcp_var[1]["parameterCategory"], Value::from(1));
        assert_eq!(pcp_var[1]["parameterNumber"], Value::from(75));
        assert_eq!(pcp_var[2], Value::from("sprate"));
        assert_eq!(value["pcp"]["postprocess"], Value::from("tp_deode"));

        assert_eq!(value["rain"]["var"], Value::from("tirf"));
        assert_eq!(value["rain"]["postprocess"], Value::from("None"));

        assert_eq!(value["lat"]["var"], Value::from("lat"));
        assert!(value["lat"].get("accum").is_none());
    }

    #[test]
    fn table_is_sorted_by_name() {
        let names: Vec<_> = verification_variables().into_keys().collect();
        assert_eq!(names, ["lat", "lon", "pcp", "rain"]);
    }
}
