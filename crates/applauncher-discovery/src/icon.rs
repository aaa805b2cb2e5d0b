//! Resolution of well-known icon names to server-hosted images.

/// Icon names the server hosts, paired with their path below the server URL.
const WELL_KNOWN_ICONS: &[(&str, &str)] = &[
    ("hiero", "/application_icons/hiero.png"),
    ("hieroplayer", "/application_icons/hieroplayer.png"),
    ("nukex", "/application_icons/nukex.png"),
    ("nuke", "/application_icons/nuke.png"),
    ("nuke_studio", "/application_icons/nuke_studio.png"),
    ("premiere", "/application_icons/premiere.png"),
    ("maya", "/application_icons/maya.png"),
    ("cinesync", "/application_icons/cinesync.png"),
    ("photoshop", "/application_icons/photoshop.png"),
    ("prelude", "/application_icons/prelude.png"),
    ("after_effects", "/application_icons/after_effects.png"),
    ("3ds_max", "/application_icons/3ds_max.png"),
    ("cinema_4d", "/application_icons/cinema_4d.png"),
    ("indesign", "/application_icons/indesign.png"),
    ("illustrator", "/application_icons/illustrator.png"),
    ("houdini", "/application_icons/houdini.png"),
    ("unreal-engine", "/application_icons/unreal_engine.png"),
    ("unity", "/application_icons/unity.png"),
    ("rv", "/application_icons/rv.png"),
];

/// Turns configured icon names into URLs when the server hosts them.
///
/// # Example
///
/// ```
/// use applauncher_discovery::IconResolver;
///
/// let resolver = IconResolver::new(Some("https://studio.example.com/".into()));
/// assert_eq!(
///     resolver.resolve("maya"),
///     "https://studio.example.com/application_icons/maya.png"
/// );
/// assert_eq!(resolver.resolve("custom.png"), "custom.png");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconResolver {
    server_url: Option<String>,
}

impl IconResolver {
    /// Creates a resolver for icons hosted under `server_url`.
    #[must_use]
    pub fn new(server_url: Option<String>) -> Self {
        Self {
            server_url: server_url.map(|url| url.trim_end_matches('/').to_owned()),
        }
    }

    /// Returns the URL for `name`, or `name` itself when it is not hosted.
    #[must_use]
    pub fn resolve(&self, name: &str) -> String {
        let Some(server_url) = self.server_url.as_deref() else {
            return name.to_owned();
        };
        WELL_KNOWN_ICONS
            .iter()
            .find(|(known, _)| *known == name)
            .map_or_else(|| name.to_owned(), |(_, path)| format!("{server_url}{path}"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("nuke_studio", "https://ftrack.test/application_icons/nuke_studio.png")]
    #[case("unreal-engine", "https://ftrack.test/application_icons/unreal_engine.png")]
    #[case("blender", "blender")]
    fn resolves_against_server(#[case] name: &str, #[case] expected: &str) {
        let resolver = IconResolver::new(Some(String::from("https://ftrack.test")));
        assert_eq!(resolver.resolve(name), expected);
    }

    #[test]
    fn passes_through_without_server() {
        assert_eq!(IconResolver::default().resolve("maya"), "maya");
    }
}
