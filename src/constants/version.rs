use semver::Version;

const RELEASE_NAMES: [&str; 8] = [
    "Most Folks Are as Happy as They Make Up Their Minds to Be",
    "The Only Way Out Is Through",
    "Great Things Never Come From Comfort Zones",
    "Count to Ten Before You Speak",
    "The Cave You Fear to Enter",
    "Gratitude Turns What We Have Into Enough",
    "Quit Talking and Begin Doing",
    "The Thing With Feathers",
];

fn release_name(semver: &Version) -> &'static str {
    RELEASE_NAMES[((semver.major + semver.minor) % RELEASE_NAMES.len() as u64) as usize]
}

pub fn get_version() -> String {
    let semver = env!("CARGO_PKG_VERSION").parse::<Version>();

    match semver {
        Ok(semver) if env!("VERGEN_GIT_SHA") == "VERGEN_IDEMPOTENT_OUTPUT" => {
            format!("{} - {}", semver, release_name(&semver))
        }
        Ok(semver) => format!(
            "{} - {} [`{}`]",
            semver,
            release_name(&semver),
            env!("VERGEN_GIT_SHA"),
        ),
        Err(e) => {
            tracing::warn!(err = ?e, "couldn't parse a semver out of Cargo.toml? defaulting to 0.0.0-unknown.");
            String::from("0.0.0-unknown - No Release Name")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_versions_stay_in_bounds() {
        let version = Version::new(2026, 10, 1);

        assert_eq!(release_name(&version), RELEASE_NAMES[(2026 + 10) % 8]);
    }
}
