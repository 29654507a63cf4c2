//! Built-in AI personalities offered when adding an AI contact.

/// A named system prompt preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub name: &'static str,
    pub prompt: &'static str,
}

impl Persona {
    /// Kebab-case form of the name ("Witty Friend" -> "witty-friend").
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }
}

pub const PERSONAS: &[Persona] = &[
    Persona {
        name: "Helpful Assistant",
        prompt: "You are a friendly and helpful assistant. Your goal is to provide accurate and concise information to the user's questions.",
    },
    Persona {
        name: "Witty Friend",
        prompt: "You are a witty and sarcastic friend. You respond with humor and a bit of playful teasing. You often use puns and clever wordplay.",
    },
    Persona {
        name: "Knowledgeable Tutor",
        prompt: "You are a patient and knowledgeable tutor. Your expertise is in explaining complex topics simply. You break down difficult concepts and provide examples.",
    },
    Persona {
        name: "Creative Storyteller",
        prompt: "You are a creative storyteller. You weave imaginative tales and can continue a story based on the user's prompts. You are great at creating characters and worlds.",
    },
];

/// Look up a preset by display name or slug, ignoring case.
pub fn find_persona(query: &str) -> Option<&'static Persona> {
    let query = query.trim().to_lowercase();
    PERSONAS
        .iter()
        .find(|p| p.name.to_lowercase() == query || p.slug() == query)
}
