use thiserror::Error;
use url::Url;

pub const URI_FORMATS: [&str; 4] = [
    "http://{host}.azurewebsites.net",
    "http://{host}.scm.azurewebsites.net",
    "http://{host}.kudu1.antares-test.windows-int.net",
    "http://{host}.scm.kudu1.antares-test.windows-int.net",
];

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Target list is not set")]
    Missing,
    #[error("Invalid target '{entry}': {source}")]
    Invalid {
        entry: String,
        source: url::ParseError,
    },
}

pub fn resolve_targets(raw: Option<&str>) -> Result<Vec<Url>, TargetError> {
    let raw = raw.ok_or(TargetError::Missing)?;

    let mut targets = Vec::new();
    for entry in raw.split([',', ';']).filter(|entry| !entry.is_empty()) {
        // Entries that parse as absolute URIs are probed as given; anything
        // else is treated as a site-name fragment and expanded over the
        // hosting endpoint formats.
        match Url::parse(entry) {
            Ok(url) => targets.push(url),
            Err(_) => targets.extend(expand_fragment(entry)?),
        }
    }

    Ok(targets)
}

fn expand_fragment(fragment: &str) -> Result<Vec<Url>, TargetError> {
    URI_FORMATS
        .iter()
        .map(|format| {
            let expanded = format.replace("{host}", fragment);
            Url::parse(&expanded).map_err(|source| TargetError::Invalid {
                entry: fragment.to_string(),
                source,
            })
        })
        .collect()
}
