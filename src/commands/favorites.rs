use futures::StreamExt;
use poise::serenity_prelude::*;

use crate::{constants::EMBED_COLOR, models::favorites::FavoriteRecord, Context, Error};

const PAGE_SIZE: usize = 10;

fn favorites_pages(favorites: &[FavoriteRecord]) -> Vec<String> {
    let mut pages: Vec<String> = vec![];

    for (page, chunk) in favorites.chunks(PAGE_SIZE).enumerate() {
        let mut favorites_str = String::new();

        for (idx, favorite) in chunk.iter().enumerate() {
            let entry_str = match &favorite.mood {
                Some(mood) => format!(
                    "{}. \"{}\" — {} ({})\n",
                    idx + 1 + page * PAGE_SIZE,
                    favorite.text,
                    favorite.author,
                    mood
                ),
                None => format!(
                    "{}. \"{}\" — {}\n",
                    idx + 1 + page * PAGE_SIZE,
                    favorite.text,
                    favorite.author
                ),
            };

            favorites_str = favorites_str + &entry_str;
        }

        pages.push(favorites_str);
    }

    if pages.is_empty() {
        pages.push(String::from(
            "no favorites yet. tap the favorite button on a quote!",
        ));
    }

    pages
}

fn page_embed(pages: &[String], current_page: usize) -> CreateEmbed {
    CreateEmbed::default()
        .color(EMBED_COLOR)
        .title("favorites")
        .description(pages[current_page].clone())
        .footer(CreateEmbedFooter::new(format!(
            "page {}/{}",
            current_page + 1,
            pages.len(),
        )))
}

fn page_buttons(ctx_id: u64, pages: &[String], current_page: usize) -> Vec<CreateActionRow> {
    let last_page = pages.len() - 1;

    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(format!("{}first", ctx_id))
            .emoji('⏮')
            .disabled(current_page == 0),
        CreateButton::new(format!("{}prev", ctx_id))
            .emoji('◀')
            .disabled(current_page == 0),
        CreateButton::new(format!("{}next", ctx_id))
            .emoji('▶')
            .disabled(current_page == last_page),
        CreateButton::new(format!("{}last", ctx_id))
            .emoji('⏭')
            .disabled(current_page == last_page),
    ])]
}

/// list your favorite quotes.
///
/// the list keeps itself up to date while it's open.
#[tracing::instrument(skip_all)]
#[poise::command(
    prefix_command,
    slash_command,
    aliases("favs"),
    subcommands("list_favorites", "delete_favorite")
)]
pub async fn favorites(ctx: Context<'_>) -> Result<(), Error> {
    show_favorites(ctx).await
}

/// list your favorite quotes.
#[tracing::instrument(skip_all)]
#[poise::command(prefix_command, slash_command, rename = "list")]
pub async fn list_favorites(ctx: Context<'_>) -> Result<(), Error> {
    show_favorites(ctx).await
}

async fn show_favorites(ctx: Context<'_>) -> Result<(), Error> {
    let store = &ctx.data().favorites;

    let msg = ctx
        .send(
            poise::CreateReply::default()
                .reply(true)
                .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
                .content("loading... please wait warmly..."),
        )
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    let mut pages = favorites_pages(&store.list().await);
    let mut current_page: usize = 0;

    let ctx_id = ctx.id();
    let author_id = ctx.author().id;
    let first_id = format!("{}first", ctx_id);
    let last_id = format!("{}last", ctx_id);
    let prev_id = format!("{}prev", ctx_id);
    let next_id = format!("{}next", ctx_id);

    msg.edit(
        ctx,
        poise::CreateReply::default()
            .reply(true)
            .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
            .content("here are your favorites!")
            .embed(page_embed(&pages, current_page))
            .components(page_buttons(ctx_id, &pages, current_page)),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when editing message"))?;

    let mut presses = Box::pin(
        collector::ComponentInteractionCollector::new(ctx)
            .filter(move |press| press.data.custom_id.starts_with(&ctx_id.to_string()))
            .timeout(std::time::Duration::from_secs(60))
            .stream(),
    );
    let mut subscription = store.subscribe();

    loop {
        tokio::select! {
            press = presses.next() => {
                let Some(press) = press else {
                    break;
                };

                if press.user.id != author_id {
                    press
                        .create_response(
                            ctx,
                            CreateInteractionResponse::Message(
                                CreateInteractionResponseMessage::new()
                                    .content("you cannot interact with another user's invoked command!")
                                    .ephemeral(true),
                            ),
                        )
                        .await
                        .inspect_err(
                            |e| tracing::error!(err = ?e, "an error occurred when creating response"),
                        )?;

                    continue;
                }

                if press.data.custom_id == prev_id {
                    current_page = current_page.saturating_sub(1);
                } else if press.data.custom_id == next_id {
                    current_page = (current_page + 1).min(pages.len() - 1);
                } else if press.data.custom_id == first_id {
                    current_page = 0;
                } else if press.data.custom_id == last_id {
                    current_page = pages.len() - 1;
                } else {
                    continue;
                }

                press
                    .create_response(
                        ctx,
                        CreateInteractionResponse::UpdateMessage(
                            CreateInteractionResponseMessage::new()
                                .embed(page_embed(&pages, current_page))
                                .components(page_buttons(ctx_id, &pages, current_page)),
                        ),
                    )
                    .await
                    .inspect_err(
                        |e| tracing::error!(err = ?e, "an error occurred when creating response"),
                    )?;
            }
            Some(event) = subscription.recv() => {
                if !event.touches_favorites() {
                    continue;
                }

                tracing::debug!(?event, "favorites changed, refreshing list");

                pages = favorites_pages(&store.list().await);
                current_page = current_page.min(pages.len() - 1);

                msg.edit(
                    ctx,
                    poise::CreateReply::default()
                        .embed(page_embed(&pages, current_page))
                        .components(page_buttons(ctx_id, &pages, current_page)),
                )
                .await
                .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when editing message"))?;
            }
        }
    }

    subscription.unsubscribe();

    msg.into_message()
        .await?
        .edit(ctx, EditMessage::default().components(vec![]))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when editing message"))?;

    Ok(())
}

/// remove a favorite by its position in the list.
#[tracing::instrument(skip(ctx))]
#[poise::command(prefix_command, slash_command, rename = "delete")]
pub async fn delete_favorite(
    ctx: Context<'_>,
    #[description = "position of the quote in your favorites list"] position: usize,
) -> Result<(), Error> {
    let store = &ctx.data().favorites;

    let favorites = store.list().await;
    let favorite = position
        .checked_sub(1)
        .and_then(|idx| favorites.into_iter().nth(idx));

    let Some(favorite) = favorite else {
        ctx.say(format!("there's no favorite #{position}."))
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

        return Ok(());
    };

    match store.remove(&favorite).await {
        Ok(()) => {
            ctx.say(format!(
                "removed \"{}\" — {} from your favorites.",
                favorite.text, favorite.author
            ))
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;
        }
        Err(e) => {
            tracing::warn!(err = ?e, text = %favorite.text, "couldn't remove favorite");

            let reply = ctx
                .send(
                    poise::CreateReply::default()
                        .ephemeral(true)
                        .content("couldn't update your favorites right now... please try again later."),
                )
                .await
                .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

            tokio::time::sleep(std::time::Duration::from_secs(5)).await;

            reply
                .delete(ctx)
                .await
                .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when deleting reply"))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favorite(n: usize, mood: Option<&str>) -> FavoriteRecord {
        FavoriteRecord {
            id: None,
            text: format!("quote {n}"),
            author: String::from("someone"),
            mood: mood.map(str::to_owned),
            created_at: None,
        }
    }

    #[test]
    fn empty_list_still_has_a_page() {
        let pages = favorites_pages(&[]);

        assert_eq!(pages.len(), 1);
        assert!(pages[0].starts_with("no favorites yet"));
    }

    #[test]
    fn pages_hold_ten_entries_numbered_across_pages() {
        let favorites: Vec<_> = (1..=23).map(|n| favorite(n, None)).collect();
        let pages = favorites_pages(&favorites);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].lines().count(), 10);
        assert_eq!(pages[2].lines().count(), 3);
        assert!(pages[1].starts_with("11. \"quote 11\" — someone\n"));
    }

    #[test]
    fn mood_is_shown_when_known() {
        let pages = favorites_pages(&[favorite(1, Some("Sad"))]);

        assert_eq!(pages[0], "1. \"quote 1\" — someone (Sad)\n");
    }
}
