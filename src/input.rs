use std::path::Path;

use json::JsonValue;

use crate::{
    datatypes::{Parameters, Stiffnesses},
    error::GutLegError,
};

/// Parses the input json into a JsonValue object
///
/// # Arguments
/// * `input_file` - The path to the input file
///
/// # Returns
/// A JsonValue object with at least a `metadata` section
pub fn load_input_file(input_file: &Path) -> Result<JsonValue, GutLegError> {
    let file_string = std::fs::read_to_string(input_file)
        .map_err(|err| GutLegError::io(input_file, err))?;

    let input_json = match json::parse(&file_string) {
        Ok(j) => j,
        Err(err) => {
            return Err(GutLegError::Input(format!(
                "Error in input file json: {err}"
            )))
        }
    };

    if !input_json.has_key("metadata") {
        return Err(GutLegError::Input(
            "Input json missing metadata field".to_owned(),
        ));
    }
    for key in ["Lx", "Nx", "gut_diameter", "leg_diameter"] {
        if !input_json["metadata"].has_key(key) {
            return Err(GutLegError::Input(format!(
                "Input json missing {key} field in metadata section"
            )));
        }
    }

    Ok(input_json)
}

fn optional_f64(section: &JsonValue, key: &str, default: f64) -> Result<f64, GutLegError> {
    if !section.has_key(key) {
        return Ok(default);
    }
    section[key]
        .as_f64()
        .ok_or_else(|| GutLegError::Input(format!("Bad value for {key}")))
}

fn optional_str(section: &JsonValue, key: &str, default: &str) -> Result<String, GutLegError> {
    if !section.has_key(key) {
        return Ok(default.to_owned());
    }
    section[key]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| GutLegError::Input(format!("{key} must be a string")))
}

fn optional_bool(section: &JsonValue, key: &str, default: bool) -> Result<bool, GutLegError> {
    if !section.has_key(key) {
        return Ok(default);
    }
    section[key]
        .as_bool()
        .ok_or_else(|| GutLegError::Input(format!("{key} must be true or false")))
}

/// Reads run parameters out of the input json, falling back to the defaults
/// for anything optional.
///
/// A missing `ds` becomes `Lx / (2 Nx)`. Values are type-checked here; range
/// checks are left to [`validate`] so command-line overrides can apply first.
pub fn parse_parameters(input_json: &JsonValue) -> Result<Parameters, GutLegError> {
    let defaults = Parameters::default();
    let metadata = &input_json["metadata"];

    let domain_length = metadata["Lx"]
        .as_f64()
        .ok_or_else(|| GutLegError::Input("Bad value for Lx".to_owned()))?;
    let grid_resolution = metadata["Nx"]
        .as_usize()
        .ok_or_else(|| GutLegError::Input("Nx must be a positive integer".to_owned()))?;
    let gut_diameter = metadata["gut_diameter"]
        .as_f64()
        .ok_or_else(|| GutLegError::Input("Bad value for gut_diameter".to_owned()))?;
    let leg_diameter = metadata["leg_diameter"]
        .as_f64()
        .ok_or_else(|| GutLegError::Input("Bad value for leg_diameter".to_owned()))?;

    let ds = if metadata.has_key("ds") {
        optional_f64(metadata, "ds", 0.0)?
    } else {
        domain_length / (2.0 * grid_resolution as f64)
    };

    let structure_name = optional_str(metadata, "structure_name", &defaults.structure_name)?;

    let stiffness_json = &input_json["stiffness"];
    let stiffness = Stiffnesses {
        spring: optional_f64(stiffness_json, "spring", defaults.stiffness.spring)?,
        cross_spring: optional_f64(
            stiffness_json,
            "cross_spring",
            defaults.stiffness.cross_spring,
        )?,
        beam: optional_f64(stiffness_json, "beam", defaults.stiffness.beam)?,
        target: optional_f64(stiffness_json, "target", defaults.stiffness.target)?,
        porosity: optional_f64(stiffness_json, "porosity", defaults.stiffness.porosity)?,
        seed_beam_curvature: optional_bool(
            stiffness_json,
            "seed_beam_curvature",
            defaults.stiffness.seed_beam_curvature,
        )?,
    };

    Ok(Parameters {
        structure_name,
        domain_length,
        grid_resolution,
        ds,
        gut_diameter,
        leg_diameter,
        span_start: optional_f64(metadata, "span_start", defaults.span_start)?,
        span_end: optional_f64(metadata, "span_end", defaults.span_end)?,
        centerline: optional_f64(metadata, "centerline", defaults.centerline)?,
        stiffness,
    })
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Rejects parameter sets that cannot describe a gut inside a leg
pub fn validate(params: &Parameters) -> Result<(), GutLegError> {
    if params.structure_name.trim().is_empty() {
        return Err(GutLegError::Input("Empty structure name".to_owned()));
    }
    if !is_positive(params.domain_length) {
        return Err(GutLegError::Input("Lx must be positive".to_owned()));
    }
    if params.grid_resolution == 0 {
        return Err(GutLegError::Input("Nx must be positive".to_owned()));
    }
    if !is_positive(params.ds) {
        return Err(GutLegError::Input("ds must be positive".to_owned()));
    }
    if !is_positive(params.gut_diameter) || !is_positive(params.leg_diameter) {
        return Err(GutLegError::Input("Duct diameters must be positive".to_owned()));
    }
    if params.gut_diameter >= params.leg_diameter {
        return Err(GutLegError::Input(format!(
            "Gut diameter {} must be smaller than leg diameter {}",
            params.gut_diameter, params.leg_diameter
        )));
    }
    if !(0.0 <= params.span_start && params.span_start < params.span_end && params.span_end <= 1.0)
    {
        return Err(GutLegError::Input(format!(
            "Duct span [{}, {}] must be an increasing range inside [0, 1]",
            params.span_start, params.span_end
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn input(text: &str) -> JsonValue {
        json::parse(text).unwrap()
    }

    #[test]
    fn reads_full_input() {
        let params = parse_parameters(&input(
            r#"{
                "metadata": {
                    "structure_name": "gut_in_leg",
                    "Lx": 2.0, "Nx": 512, "ds": 0.001,
                    "gut_diameter": 0.1, "leg_diameter": 0.3,
                    "span_start": 0.1, "span_end": 0.9, "centerline": 0.4
                },
                "stiffness": {
                    "spring": 1e6, "cross_spring": 2e4, "beam": 3e8,
                    "target": 4e6, "porosity": 0.5, "seed_beam_curvature": true
                }
            }"#,
        ))
        .unwrap();

        assert_eq!(params.structure_name, "gut_in_leg");
        assert_eq!(params.grid_resolution, 512);
        assert_relative_eq!(params.domain_length, 2.0);
        assert_relative_eq!(params.ds, 0.001);
        assert_relative_eq!(params.centerline, 0.4);
        assert_relative_eq!(params.stiffness.cross_spring, 2e4);
        assert_relative_eq!(params.stiffness.porosity, 0.5);
        assert!(params.stiffness.seed_beam_curvature);
    }

    #[test]
    fn missing_ds_follows_grid() {
        let params = parse_parameters(&input(
            r#"{"metadata": {"Lx": 1.0, "Nx": 256, "gut_diameter": 0.05, "leg_diameter": 0.1}}"#,
        ))
        .unwrap();

        assert_relative_eq!(params.ds, 1.0 / 512.0);
        assert_eq!(params.structure_name, Parameters::default().structure_name);
        assert_eq!(params.stiffness, Parameters::default().stiffness);
    }

    #[test]
    fn rejects_nested_ducts_out_of_order() {
        let params = parse_parameters(&input(
            r#"{"metadata": {"Lx": 1.0, "Nx": 256, "gut_diameter": 0.2, "leg_diameter": 0.1}}"#,
        ))
        .unwrap();
        assert!(matches!(validate(&params), Err(GutLegError::Input(_))));
    }

    #[test]
    fn out_of_range_values_parse_until_validated() {
        let params = parse_parameters(&input(
            r#"{"metadata": {"Lx": 1.0, "Nx": 256, "ds": -0.5, "gut_diameter": 0.05, "leg_diameter": 0.1}}"#,
        ))
        .unwrap();
        assert_relative_eq!(params.ds, -0.5);
        assert!(validate(&params).is_err());
    }

    #[test]
    fn rejects_wrongly_typed_name_and_flag() {
        let result = parse_parameters(&input(
            r#"{"metadata": {"structure_name": 7, "Lx": 1.0, "Nx": 256, "gut_diameter": 0.05, "leg_diameter": 0.1}}"#,
        ));
        assert!(matches!(result, Err(GutLegError::Input(_))));

        let result = parse_parameters(&input(
            r#"{
                "metadata": {"Lx": 1.0, "Nx": 256, "gut_diameter": 0.05, "leg_diameter": 0.1},
                "stiffness": {"seed_beam_curvature": "yes"}
            }"#,
        ));
        assert!(matches!(result, Err(GutLegError::Input(_))));
    }

    #[test]
    fn rejects_bad_span() {
        let params = Parameters {
            span_start: 0.8,
            span_end: 0.2,
            ..Parameters::default()
        };
        assert!(validate(&params).is_err());

        let params = Parameters {
            ds: 0.0,
            ..Parameters::default()
        };
        assert!(validate(&params).is_err());
    }

    #[test]
    fn rejects_non_numeric_stiffness() {
        let result = parse_parameters(&input(
            r#"{
                "metadata": {"Lx": 1.0, "Nx": 256, "gut_diameter": 0.05, "leg_diameter": 0.1},
                "stiffness": {"beam": "stiff"}
            }"#,
        ));
        assert!(matches!(result, Err(GutLegError::Input(_))));
    }

    #[test]
    fn input_file_needs_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.json");

        std::fs::write(&path, r#"{"stiffness": {}}"#).unwrap();
        assert!(matches!(load_input_file(&path), Err(GutLegError::Input(_))));

        std::fs::write(&path, r#"{"metadata": {"Lx": 1.0, "Nx": 8}}"#).unwrap();
        assert!(matches!(load_input_file(&path), Err(GutLegError::Input(_))));

        std::fs::write(
            &path,
            r#"{"metadata": {"Lx": 1.0, "Nx": 8, "gut_diameter": 0.05, "leg_diameter": 0.1}}"#,
        )
        .unwrap();
        assert!(load_input_file(&path).is_ok());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&Parameters::default()).is_ok());
    }
}
