//! Narration phrase tables
//!
//! Phrase templates use `{name}` as the placeholder for the item's display
//! name. Social phrasing is a strategy table keyed by profile.

use serde::{Deserialize, Serialize};

use super::Profile;
use crate::types::Locale;

/// Wording family used by social steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialStyle {
    Social,
    Calm,
    Structured,
}

/// (style, en, pt)
const SOCIAL_PHRASES: &[(SocialStyle, &str, &str)] = &[
    (SocialStyle::Social, "Let's show a friend the {name}!", "Vamos mostrar {name} para um amigo!"),
    (SocialStyle::Calm, "Nice and slow. This is {name}.", "Bem devagar. Este é {name}."),
    (SocialStyle::Structured, "First we look. Then we say: {name}.", "Primeiro olhamos. Depois dizemos: {name}."),
];

/// Profiles without an entry get no social narration
const PROFILE_STYLES: &[(Profile, SocialStyle)] = &[
    (Profile::Williams, SocialStyle::Social),
    (Profile::DownSyndrome, SocialStyle::Calm),
    (Profile::Autism, SocialStyle::Structured),
    (Profile::Adhd, SocialStyle::Structured),
];

const ENTHUSIASTIC: (&str, &str) = ("Listen! {name}!", "Escute! {name}!");
const SING_ALONG: (&str, &str) = ("Let's sing about {name}!", "Vamos cantar sobre {name}!");
const PRAISE_STRONG: (&str, &str) = ("Amazing! You did it!", "Incrível! Você conseguiu!");
const PRAISE_GENTLE: (&str, &str) = ("Well done.", "Muito bem.");

pub(super) fn social_style(profile: Profile) -> Option<SocialStyle> {
    PROFILE_STYLES
        .iter()
        .find(|(p, _)| *p == profile)
        .map(|(_, style)| *style)
}

fn pick(pair: (&'static str, &'static str), locale: Locale) -> &'static str {
    match locale {
        Locale::En => pair.0,
        Locale::Pt => pair.1,
    }
}

fn render(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}

/// Social phrase for a profile, or `None` when the profile has no style
pub fn social(profile: Profile, name: &str, locale: Locale) -> Option<String> {
    let style = social_style(profile)?;
    SOCIAL_PHRASES
        .iter()
        .find(|(s, _, _)| *s == style)
        .map(|(_, en, pt)| render(pick((*en, *pt), locale), name))
}

/// Enthusiastic framing of a display name
pub fn enthusiastic(name: &str, locale: Locale) -> String {
    render(pick(ENTHUSIASTIC, locale), name)
}

/// Sing-along framing used by song steps
pub fn sing_along(name: &str, locale: Locale) -> String {
    render(pick(SING_ALONG, locale), name)
}

/// Praise used by feedback steps
pub fn praise(strong: bool, locale: Locale) -> &'static str {
    if strong {
        pick(PRAISE_STRONG, locale)
    } else {
        pick(PRAISE_GENTLE, locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_phrase_differs_by_profile() {
        let williams = social(Profile::Williams, "dog", Locale::En).unwrap();
        let autism = social(Profile::Autism, "dog", Locale::En).unwrap();
        let ds = social(Profile::DownSyndrome, "dog", Locale::En).unwrap();
        assert_ne!(williams, autism);
        assert_ne!(autism, ds);
        assert!(williams.contains("dog"));
    }

    #[test]
    fn test_profile_without_style_has_no_phrase() {
        assert!(social(Profile::Other, "dog", Locale::En).is_none());
        assert!(social(Profile::Dyslexia, "dog", Locale::Pt).is_none());
    }

    #[test]
    fn test_localized_templates() {
        assert_eq!(enthusiastic("gato", Locale::Pt), "Escute! gato!");
        assert_eq!(sing_along("cat", Locale::En), "Let's sing about cat!");
        assert_ne!(praise(true, Locale::En), praise(false, Locale::En));
    }
}
