use poise::serenity_prelude::*;

use std::time::Duration;

use crate::{
    commands::spawn_after,
    constants::EMBED_COLOR,
    models::{
        favorites::NewFavorite,
        quotes::{MoodEntry, Quote},
    },
    moods,
    storage::StorageError,
    Context, Error,
};

const NOTICE_LIFETIME: Duration = Duration::from_secs(5);

struct ButtonIds {
    favorite: String,
    copy: String,
    another: String,
}

impl ButtonIds {
    fn new(ctx_id: u64) -> Self {
        ButtonIds {
            favorite: format!("{}favorite", ctx_id),
            copy: format!("{}copy", ctx_id),
            another: format!("{}another", ctx_id),
        }
    }
}

fn owns_button(ctx_id: u64, custom_id: &str) -> bool {
    custom_id.starts_with(&ctx_id.to_string())
}

struct QuoteCard {
    quote: Quote,
    mood: &'static MoodEntry,
    favorited: bool,
}

impl QuoteCard {
    fn embed(&self) -> CreateEmbed {
        CreateEmbed::default()
            .color(EMBED_COLOR)
            .title(format!("{} Mood: {}", self.mood.emoji, self.mood.label))
            .description(format!("\"{}\"", self.quote.text))
            .footer(CreateEmbedFooter::new(format!("— {}", self.quote.author)))
    }

    fn buttons(&self, ids: &ButtonIds) -> Vec<CreateActionRow> {
        let (label, emoji) = favorite_button(self.favorited);

        vec![CreateActionRow::Buttons(vec![
            CreateButton::new(&ids.favorite)
                .label(label)
                .emoji(emoji)
                .style(ButtonStyle::Primary),
            CreateButton::new(&ids.copy)
                .label("copy")
                .emoji('📋')
                .style(ButtonStyle::Secondary),
            CreateButton::new(&ids.another)
                .label("another one")
                .emoji('🔄')
                .style(ButtonStyle::Secondary),
        ])]
    }
}

fn favorite_button(favorited: bool) -> (&'static str, char) {
    if favorited {
        ("favorited", '💖')
    } else {
        ("favorite", '🤍')
    }
}

pub async fn autocomplete_mood<'a>(
    _ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = String> + 'a {
    let partial = partial.trim().to_lowercase();

    let suggestions: Vec<String> = if partial.is_empty() {
        moods::featured_moods()
            .map(|mood| mood.key.to_owned())
            .collect()
    } else {
        moods::mood_keys()
            .filter(|key| key.starts_with(&partial))
            .map(str::to_owned)
            .collect()
    };

    suggestions.into_iter()
}

/// adds the quote as a favorite, or removes it if it already is one.
/// returns whether the quote is a favorite afterwards.
async fn toggle_favorite(ctx: Context<'_>, card: &QuoteCard) -> Result<bool, StorageError> {
    let favorites = &ctx.data().favorites;

    match favorites.find(&card.quote).await {
        Some(record) => {
            favorites.remove(&record).await?;
            Ok(false)
        }
        None => {
            favorites
                .add(&NewFavorite::new(card.quote.clone(), Some(card.mood.label)))
                .await?;
            Ok(true)
        }
    }
}

async fn notify_briefly(
    ctx: Context<'_>,
    press: &ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    press
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when creating response"))?;

    // the collector keeps listening while the notice is up
    let http = ctx.serenity_context().http.clone();
    let press = press.clone();
    spawn_after(NOTICE_LIFETIME, async move {
        if let Err(e) = press.delete_response(&http).await {
            tracing::error!(err = ?e, "an error occurred when deleting response");
        }
    });

    Ok(())
}

/// tell me how you feel and i'll find a quote for it.
///
/// try one of happy, sad, inspired, angry, anxious, grateful, excited or hopeful,
/// or just describe your mood in your own words.
#[tracing::instrument(skip(ctx))]
#[poise::command(prefix_command, slash_command)]
pub async fn mood(
    ctx: Context<'_>,
    #[description = "how are you feeling today?"]
    #[autocomplete = "autocomplete_mood"]
    #[rest]
    mood: String,
) -> Result<(), Error> {
    if mood.trim().is_empty() {
        ctx.say("tell me how you're feeling first! something like `q>mood hopeful`.")
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

        return Ok(());
    }

    let (quote, entry) = moods::resolve_mood(&mood);
    let favorited = ctx.data().favorites.contains(&quote).await;
    let mut card = QuoteCard {
        quote,
        mood: entry,
        favorited,
    };

    let ctx_id = ctx.id();
    let author_id = ctx.author().id;
    let ids = ButtonIds::new(ctx_id);

    let msg = ctx
        .send(
            poise::CreateReply::default()
                .reply(true)
                .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
                .embed(card.embed())
                .components(card.buttons(&ids)),
        )
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    while let Some(press) = collector::ComponentInteractionCollector::new(ctx)
        .filter(move |press| owns_button(ctx_id, &press.data.custom_id))
        .timeout(Duration::from_secs(120))
        .await
    {
        if press.user.id != author_id {
            press
                .create_response(
                    ctx,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content("this quote belongs to someone else! ask for your own with `q>mood`.")
                            .ephemeral(true),
                    ),
                )
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, "an error occurred when creating response"),
                )?;

            continue;
        }

        if press.data.custom_id == ids.favorite {
            match toggle_favorite(ctx, &card).await {
                Ok(favorited) => card.favorited = favorited,
                Err(e) => {
                    tracing::warn!(err = ?e, text = %card.quote.text, "couldn't toggle favorite");
                    notify_briefly(
                        ctx,
                        &press,
                        "couldn't update your favorites right now... please try again later.",
                    )
                    .await?;

                    continue;
                }
            }
        } else if press.data.custom_id == ids.copy {
            press
                .create_response(
                    ctx,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content(format!("```\n{}\n```", card.quote.copy_text()))
                            .ephemeral(true),
                    ),
                )
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, "an error occurred when creating response"),
                )?;

            continue;
        } else if press.data.custom_id == ids.another {
            card.quote = moods::pick_quote(card.mood, &mut rand::thread_rng());
            card.favorited = ctx.data().favorites.contains(&card.quote).await;
        } else {
            continue;
        }

        press
            .create_response(
                ctx,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(card.embed())
                        .components(card.buttons(&ids)),
                ),
            )
            .await
            .inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when creating response"),
            )?;
    }

    msg.into_message()
        .await?
        .edit(ctx, EditMessage::default().components(vec![]))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when editing message"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_belong_to_their_invocation() {
        let ids = ButtonIds::new(1234);

        for id in [&ids.favorite, &ids.copy, &ids.another] {
            assert!(owns_button(1234, id));
            assert!(!owns_button(99, id));
        }
        assert_ne!(ids.favorite, ids.copy);
        assert_ne!(ids.copy, ids.another);
    }

    #[test]
    fn favorite_button_reflects_state() {
        assert_eq!(favorite_button(false), ("favorite", '🤍'));
        assert_eq!(favorite_button(true), ("favorited", '💖'));
    }
}
