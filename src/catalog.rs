/// Joke "translations" revealed after analysis.
pub const PHRASES: &[&str] = &[
    "I demand a raise in treats.",
    "The cat started it. I swear.",
    "Why do you leave the room every time I fart?",
    "Is this... is this the vet again?!",
    "I dream of chasing mailmen. But also... dreams scare me.",
    "Let's discuss the squirrels. We have a problem.",
    "You left me for 4 minutes. It felt like 4 eternities.",
    "The mailman is clearly a threat to democracy.",
    "I have existential questions about tennis balls.",
    "Why does the vacuum cleaner hate me specifically?",
    "I saw a leaf move. This is not a drill.",
    "My food bowl is 90% full. This is basically starvation.",
    "The doorbell is a portal to hell and I must protect you.",
    "I've been thinking... what if cats are the real masterminds?",
    "That squirrel outside? Yeah, we have history.",
    "I would like to file a complaint about bath time.",
    "The couch is my office and I take my job very seriously.",
    "I need you to know that I love you but also your sandwich.",
    "The garbage truck is my nemesis and today we settle this.",
    "I have thoughts about your choice in house guests.",
    "Why do you keep fake throwing the ball? This is psychological warfare.",
    "I'm not fat, I'm just cultivating mass for winter.",
    "That bird outside just insulted my mother. Probably.",
    "I have a business proposal: more belly rubs, fewer baths.",
    "The doormat is suspicious and I don't trust it.",
    "Shabari think he is shabari but he is shubari.",
];

/// Character archetypes shown as a badge next to the translation.
pub const PERSONALITIES: &[&str] = &[
    "Anxious Philosopher",
    "Drama Queen",
    "Food-Driven Economist",
    "Paranoid Security Chief",
    "Nap Enthusiast",
    "Chaos Agent",
    "Existential Crisis Manager",
    "Professional Treat Negotiator",
    "Amateur Squirrel Investigator",
    "Couch Potato Overlord",
];

/// Messages rotated while the fake analysis runs.
pub const STATUS_MESSAGES: &[&str] = &[
    "Analyzing bark waves...",
    "Decoding woofs and ruffs...",
    "Consulting dog dictionary...",
    "Processing tail wag data...",
    "Interpreting snout signals...",
    "Accessing bark database...",
    "Translating good boy language...",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_sizes() {
        assert_eq!(PHRASES.len(), 26);
        assert_eq!(PERSONALITIES.len(), 10);
        assert_eq!(STATUS_MESSAGES.len(), 7);
    }

    #[test]
    fn no_empty_entries() {
        for entry in PHRASES.iter().chain(PERSONALITIES).chain(STATUS_MESSAGES) {
            assert!(!entry.trim().is_empty());
        }
    }
}
