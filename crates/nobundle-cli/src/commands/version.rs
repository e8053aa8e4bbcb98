use miette::{IntoDiagnostic, Result};
use nobundle_core::version::VersionInfo;

pub fn run(json: bool) -> Result<()> {
    let info = VersionInfo::current();
    if json {
        println!("{}", serde_json::to_string(&info).into_diagnostic()?);
    } else {
        println!("{info}");
    }
    Ok(())
}
