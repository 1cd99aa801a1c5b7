/// UPS service codes and their published names.
const SERVICE_NAMES: &[(&str, &str)] = &[
    ("01", "Next Day Air"),
    ("02", "2nd Day Air"),
    ("03", "Ground"),
    ("07", "Worldwide Express"),
    ("08", "Worldwide Expedited"),
    ("11", "Standard"),
    ("12", "3 Day Select"),
    ("13", "Next Day Air Saver"),
    ("14", "Next Day Air Early"),
    ("54", "Worldwide Express Plus"),
    ("59", "2nd Day Air A.M."),
    ("65", "Worldwide Saver"),
];

/// Looks up the published name for a service code.
pub fn service_name(code: &str) -> Option<&'static str> {
    SERVICE_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// Every service code with a known name, in table order.
pub fn known_service_codes() -> impl Iterator<Item = &'static str> {
    SERVICE_NAMES.iter().map(|(code, _)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_codes() {
        assert_eq!(service_name("03"), Some("Ground"));
        assert_eq!(service_name("59"), Some("2nd Day Air A.M."));
        assert_eq!(service_name("99"), None);
        assert_eq!(known_service_codes().count(), 12);
    }
}
