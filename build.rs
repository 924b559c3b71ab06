use anyhow::Error;
use vergen_gitcl::{Emitter, GitclBuilder};

pub fn main() -> Result<(), Error> {
    println!("cargo:rerun-if-changed=migrations");

    // release builds get the sha injected from outside the git checkout
    match std::env::var("VERGEN_GIT_SHA") {
        Ok(sha) if sha != "unknown" => {
            println!("cargo:rustc-env=VERGEN_GIT_SHA={sha}");
            Ok(())
        }
        _ => {
            let gitcl = GitclBuilder::default().sha(true).build()?;
            Emitter::default().add_instructions(&gitcl)?.emit()?;
            Ok(())
        }
    }
}
