use std::{fs, path::Path};

use crate::{CompiledMdp, MdpError, MdpSpec};

/// Parse an MDP spec from YAML text without validating it.
pub fn parse_yaml(yaml: &str) -> Result<MdpSpec, MdpError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read an MDP spec from a YAML file without validating it.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<MdpSpec, MdpError> {
    parse_yaml(&fs::read_to_string(path)?)
}

/// Read, validate and compile an MDP ready for `MdpSimulator::new`.
pub fn compile_yaml(path: impl AsRef<Path>) -> Result<CompiledMdp, MdpError> {
    load_yaml(path)?.compile()
}

/// Write a spec as YAML. Invalid specs are refused so saved files always load.
pub fn save_yaml(path: impl AsRef<Path>, spec: &MdpSpec) -> Result<(), MdpError> {
    spec.validate()?;
    fs::write(path, serde_yaml::to_string(spec)?)?;
    Ok(())
}
