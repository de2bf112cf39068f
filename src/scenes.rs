/// Built-in scene and the genre palette it suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub name: &'static str,
    pub default_genres: &'static [&'static str],
}

pub const SCENES: &[Scene] = &[
    Scene {
        name: "Workout",
        default_genres: &["Heavy Metal", "EDM", "Hip-Hop", "Pop Punk", "Trance"],
    },
    Scene {
        name: "Calm",
        default_genres: &["Ambient", "Acoustic", "Lo-Fi", "Classical", "Jazz"],
    },
    Scene {
        name: "Chill",
        default_genres: &["Indie Pop", "R&B", "Downtempo", "Reggae", "Soul"],
    },
    Scene {
        name: "Focus",
        default_genres: &["Instrumental", "Classical", "Minimal Techno", "Ambient", "Soundtrack"],
    },
    Scene {
        name: "Party",
        default_genres: &["Dance Pop", "House", "Disco", "Latin Pop", "Funk"],
    },
    Scene {
        name: "Dream",
        default_genres: &["Dream Pop", "Shoegaze", "Ambient", "Electronic", "New Age"],
    },
    Scene {
        name: "Travel",
        default_genres: &["Indie Folk", "Alternative Rock", "Pop", "Country", "Blues"],
    },
    Scene {
        name: "Gaming",
        default_genres: &["Electronic", "Soundtrack", "Chiptune", "Dubstep", "Rock"],
    },
];

pub fn find(name: &str) -> Option<&'static Scene> {
    let name = name.trim();
    SCENES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(find(" focus ").map(|s| s.name), Some("Focus"));
        assert!(find("Karaoke").is_none());
        assert!(SCENES.iter().all(|s| s.default_genres.len() == 5));
    }
}
