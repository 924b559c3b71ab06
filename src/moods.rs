use rand::Rng;

use crate::models::quotes::{MoodEntry, Quote, StaticQuote};

const fn q(text: &'static str, author: &'static str) -> StaticQuote {
    StaticQuote { text, author }
}

pub static MOODS: [MoodEntry; 8] = [
    MoodEntry {
        key: "happy",
        label: "Happy",
        emoji: "😊",
        quotes: &[
            q("The best way to cheer yourself up is to try to cheer somebody else up.", "Mark Twain"),
            q("Happiness is not something ready-made. It comes from your own actions.", "Dalai Lama"),
            q("The purpose of our lives is to be happy.", "Dalai Lama"),
            q("Happiness is when what you think, what you say, and what you do are in harmony.", "Mahatma Gandhi"),
            q("Most folks are as happy as they make up their minds to be.", "Abraham Lincoln"),
        ],
    },
    MoodEntry {
        key: "sad",
        label: "Sad",
        emoji: "😢",
        quotes: &[
            q("The wound is the place where the Light enters you.", "Rumi"),
            q("Every saint has a past, and every sinner has a future.", "Oscar Wilde"),
            q("The only way out is through.", "Robert Frost"),
            q("Tears are words that need to be written.", "Paulo Coelho"),
            q("The deeper that sorrow carves into your being, the more joy you can contain.", "Kahlil Gibran"),
        ],
    },
    MoodEntry {
        key: "inspired",
        label: "Inspired",
        emoji: "💡",
        quotes: &[
            q("The future belongs to those who believe in the beauty of their dreams.", "Eleanor Roosevelt"),
            q("Innovation distinguishes between a leader and a follower.", "Steve Jobs"),
            q("The only impossible journey is the one you never begin.", "Tony Robbins"),
            q("Your limitation—it's only your imagination.", "Unknown"),
            q("Great things never come from comfort zones.", "Unknown"),
        ],
    },
    MoodEntry {
        key: "angry",
        label: "Angry",
        emoji: "😠",
        quotes: &[
            q("Holding onto anger is like grasping a hot coal with the intent of throwing it at someone else.", "Buddha"),
            q("For every minute you remain angry, you give up sixty seconds of peace of mind.", "Ralph Waldo Emerson"),
            q("Anger is an acid that can do more harm to the vessel in which it is stored than to anything on which it is poured.", "Mark Twain"),
            q("When angry, count to ten before you speak. If very angry, count to one hundred.", "Thomas Jefferson"),
            q("Speak when you are angry and you will make the best speech you will ever regret.", "Ambrose Bierce"),
        ],
    },
    MoodEntry {
        key: "anxious",
        label: "Anxious",
        emoji: "😰",
        quotes: &[
            q("You have been assigned this mountain to show others it can be moved.", "Mel Robbins"),
            q("Anxiety is the dizziness of freedom.", "Søren Kierkegaard"),
            q("Nothing in life is to be feared, it is only to be understood.", "Marie Curie"),
            q("You are braver than you believe, stronger than you seem, and smarter than you think.", "A.A. Milne"),
            q("The cave you fear to enter holds the treasure you seek.", "Joseph Campbell"),
        ],
    },
    MoodEntry {
        key: "grateful",
        label: "Grateful",
        emoji: "🙏",
        quotes: &[
            q("Gratitude turns what we have into enough.", "Anonymous"),
            q("The unthankful heart discovers no mercies; but the thankful heart will find, in every hour, some heavenly blessings.", "Henry Ward Beecher"),
            q("Gratitude is not only the greatest of virtues but the parent of all others.", "Cicero"),
            q("Be thankful for what you have; you'll end up having more.", "Oprah Winfrey"),
            q("Gratitude makes sense of our past, brings peace for today, and creates a vision for tomorrow.", "Melody Beattie"),
        ],
    },
    MoodEntry {
        key: "excited",
        label: "Excited",
        emoji: "🎉",
        quotes: &[
            q("The way to get started is to quit talking and begin doing.", "Walt Disney"),
            q("Life is what happens to you while you're busy making other plans.", "John Lennon"),
            q("The future belongs to those who believe in the beauty of their dreams.", "Eleanor Roosevelt"),
            q("It is during our darkest moments that we must focus to see the light.", "Aristotle"),
            q("Success is not final, failure is not fatal: it is the courage to continue that counts.", "Winston Churchill"),
        ],
    },
    MoodEntry {
        key: "hopeful",
        label: "Hopeful",
        emoji: "🌟",
        quotes: &[
            q("Hope is being able to see that there is light despite all of the darkness.", "Desmond Tutu"),
            q("The pessimist sees difficulty in every opportunity. The optimist sees opportunity in every difficulty.", "Winston Churchill"),
            q("Hope is the thing with feathers that perches in the soul.", "Emily Dickinson"),
            q("Once you choose hope, anything's possible.", "Christopher Reeve"),
            q("Hope is important because it can make the present moment less difficult to bear.", "Thich Nhat Hanh"),
        ],
    },
];

/// moods offered as one-tap suggestions when nothing has been typed yet.
const FEATURED: [&str; 6] = ["happy", "sad", "inspired", "angry", "anxious", "grateful"];

const DEFAULT_MOOD: usize = 0;

pub fn mood_keys() -> impl Iterator<Item = &'static str> {
    MOODS.iter().map(|mood| mood.key)
}

pub fn featured_moods() -> impl Iterator<Item = &'static MoodEntry> {
    MOODS.iter().filter(|mood| FEATURED.contains(&mood.key))
}

/// resolves free text to a mood, falling back to "happy".
pub fn find_mood(input: &str) -> &'static MoodEntry {
    let normalized = input.trim().to_lowercase();

    MOODS
        .iter()
        .find(|mood| mood.key == normalized)
        .or_else(|| {
            MOODS
                .iter()
                .find(|mood| mood.key.contains(&normalized) || normalized.contains(mood.key))
        })
        .or_else(|| MOODS.iter().find(|mood| is_near_miss(&normalized, mood.key)))
        .unwrap_or(&MOODS[DEFAULT_MOOD])
}

pub fn resolve_mood(input: &str) -> (Quote, &'static MoodEntry) {
    resolve_mood_with(input, &mut rand::thread_rng())
}

pub fn resolve_mood_with<R: Rng + ?Sized>(input: &str, rng: &mut R) -> (Quote, &'static MoodEntry) {
    let mood = find_mood(input);
    let quote = pick_quote(mood, rng);

    tracing::debug!(input = %input, mood = %mood.key, author = %quote.author, "resolved mood");

    (quote, mood)
}

pub fn pick_quote<R: Rng + ?Sized>(mood: &MoodEntry, rng: &mut R) -> Quote {
    // every entry in the table is non-empty
    mood.quotes[rng.gen_range(0..mood.quotes.len())].to_quote()
}

// a dropped letter or two: "anxius", "hapy", "excted"
fn is_near_miss(input: &str, key: &str) -> bool {
    let input_len = input.chars().count();
    let key_len = key.chars().count();

    if input_len < 4 || input_len > key_len || key_len - input_len > 2 {
        return false;
    }

    let mut key_chars = key.chars();
    input.chars().all(|c| key_chars.any(|k| k == c))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn table_has_eight_moods_of_five_quotes() {
        assert_eq!(MOODS.len(), 8);
        assert!(MOODS.iter().all(|mood| mood.quotes.len() == 5));
        assert_eq!(
            mood_keys().collect::<Vec<_>>(),
            ["happy", "sad", "inspired", "angry", "anxious", "grateful", "excited", "hopeful"]
        );
    }

    #[test]
    fn exact_keys_resolve_to_their_entry() {
        let mut rng = StdRng::seed_from_u64(7);

        for mood in &MOODS {
            let (quote, resolved) = resolve_mood_with(mood.key, &mut rng);

            assert_eq!(resolved.label, mood.label);
            assert!(resolved
                .quotes
                .iter()
                .any(|q| q.text == quote.text && q.author == quote.author));
        }
    }

    #[test]
    fn input_is_trimmed_and_lowercased() {
        assert_eq!(find_mood("  GrAteFul \n").label, "Grateful");
    }

    #[test]
    fn substring_matches_either_way() {
        // input contains the key
        assert_eq!(find_mood("very angry today").label, "Angry");
        // key contains the input
        assert_eq!(find_mood("insp").label, "Inspired");
    }

    #[test]
    fn substring_match_takes_the_first_key_in_table_order() {
        // contains both "sad" and "hopeful"
        assert_eq!(find_mood("sad but hopeful").label, "Sad");
    }

    #[test]
    fn typo_resolves_through_near_miss() {
        assert_eq!(find_mood("anxius").label, "Anxious");
        assert_eq!(find_mood("hapy").label, "Happy");
        assert_eq!(find_mood("excted").label, "Excited");
    }

    #[test]
    fn unmatched_input_defaults_to_happy() {
        for input in ["bored", "zzzz", "meh", "tired", "ok"] {
            assert_eq!(find_mood(input).label, "Happy", "input {input:?}");
        }
    }

    #[test]
    fn plain_words_are_not_mistaken_for_typos() {
        // long enough for the near-miss tier, but no key is spelled inside them
        for input in ["tire", "bored", "calm", "fine", "lonely"] {
            assert_eq!(find_mood(input).label, "Happy", "input {input:?}");
        }
    }

    #[test]
    fn empty_input_defaults_to_happy() {
        assert_eq!(find_mood("   ").label, "Happy");
    }

    #[test]
    fn every_quote_is_reachable() {
        let mut rng = StdRng::seed_from_u64(42);

        for mood in &MOODS {
            let seen: HashSet<Quote> = (0..500)
                .map(|_| resolve_mood_with(mood.key, &mut rng).0)
                .collect();

            assert_eq!(seen.len(), mood.quotes.len(), "mood {}", mood.key);
        }
    }

    #[test]
    fn featured_moods_are_the_first_six() {
        let featured: Vec<_> = featured_moods().map(|mood| mood.key).collect();

        assert_eq!(featured, FEATURED);
    }
}
