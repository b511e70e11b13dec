use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::config::EngineSettings;

/// Arguments for one pdfwrite run. The resolution is the only value that
/// varies between runs; it applies to color and gray images alike.
pub fn engine_args(resolution_dpi: u32, input: &Path, output: &Path) -> Vec<OsString> {
    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(output.as_os_str());

    let mut args: Vec<OsString> = [
        "-sDEVICE=pdfwrite",
        "-dCompatibilityLevel=1.4",
        "-dPDFSETTINGS=/screen",
        "-dNOPAUSE",
        "-dBATCH",
    ]
    .iter()
    .map(OsString::from)
    .collect();

    args.push(output_arg);
    args.push("-dDownsampleColorImages=true".into());
    args.push(format!("-dColorImageResolution={}", resolution_dpi).into());
    args.push("-dColorImageDownsampleType=/Bicubic".into());
    args.push("-dColorImageDownsampleThreshold=1.0".into());
    args.push("-dDownsampleGrayImages=true".into());
    args.push(format!("-dGrayImageResolution={}", resolution_dpi).into());
    args.push("-dGrayImageDownsampleType=/Bicubic".into());
    args.push("-dGrayImageDownsampleThreshold=1.0".into());
    args.push(input.as_os_str().to_os_string());
    args
}

pub fn build_command(
    engine: &EngineSettings,
    resolution_dpi: u32,
    input: &Path,
    output: &Path,
) -> Command {
    let mut cmd = Command::new(&engine.program);
    cmd.args(&engine.leading_args);
    cmd.args(engine_args(resolution_dpi, input, output));
    cmd
}
