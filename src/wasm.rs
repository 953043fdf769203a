#![cfg(target_arch = "wasm32")]

use crate::audio::{self, Cue, CuePlayer};
use crate::catalog::{Catalog, Chapter, DataPoint, Question};
use crate::config::QuestConfig;
use crate::leaderboard::{self, VISIBLE_ENTRIES};
use crate::metrics::{self, ChainSnapshot, MetricsReader};
use crate::progress::{PlayerState, ProgressStore};
use crate::quiz::{Advance, AnswerReveal, ChapterOutcome, POINTS_PER_CORRECT_ANSWER, QuizSession};
use crate::share::{self, CERTIFICATE_IMAGE_HEIGHT, CERTIFICATE_IMAGE_WIDTH, ShareSummary};
use crate::storage::BrowserStorage;
use leptos::*;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement};

type Store = ProgressStore<BrowserStorage>;

const COPIED_NOTICE: Duration = Duration::from_secs(2);

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = format!("[{}] {}", record.target(), record.args());
        match record.level() {
            log::Level::Error => logging::console_error(&message),
            log::Level::Warn => logging::console_warn(&message),
            _ => logging::console_log(&message),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Route {
    Landing,
    Chapter(u32),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ChapterPhase {
    Story,
    Quiz,
    Complete(ChapterOutcome),
}

/// Handles shared by every component below the app root.
#[derive(Clone, Copy)]
struct QuestState {
    catalog: StoredValue<Catalog>,
    store: StoredValue<Store>,
    cues: StoredValue<CuePlayer>,
    config: StoredValue<QuestConfig>,
    player: RwSignal<PlayerState>,
    route: RwSignal<Route>,
    muted: RwSignal<bool>,
}

impl QuestState {
    /// Runs a store mutation and publishes the resulting record.
    fn apply(&self, change: impl FnOnce(&mut Store) -> PlayerState) {
        if let Some(state) = self.store.try_update_value(change) {
            self.player.set(state);
        }
    }

    fn play(&self, cue: Cue) {
        self.cues.update_value(|cues| cues.play(cue));
    }

    fn open_chapter(&self, id: u32) {
        self.play(Cue::Click);
        self.route.set(Route::Chapter(id));
    }

    fn summary(&self, player: &PlayerState) -> ShareSummary {
        self.catalog.with_value(|catalog| ShareSummary {
            score: player.score,
            total_score: catalog.max_total_score(),
            chapters_completed: player.completed_chapters.len(),
            total_chapters: catalog.len(),
            display_name: player.display_name.clone(),
        })
    }
}

fn use_quest() -> QuestState {
    expect_context::<QuestState>()
}

fn page_origin(fallback: &str) -> String {
    window()
        .location()
        .origin()
        .ok()
        .filter(|origin| !origin.is_empty() && origin != "null")
        .unwrap_or_else(|| fallback.to_string())
}

fn open_in_new_tab(url: &str) {
    if let Err(error) = window().open_with_url_and_target(url, "_blank") {
        log::warn!("could not open {url}: {:?}", error);
    }
}

fn download(href: &str, file_name: &str) -> Result<(), JsValue> {
    let document = window()
        .document()
        .ok_or_else(|| JsValue::from_str("document unavailable"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("body unavailable"))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(JsValue::from)?;

    anchor.set_href(href);
    anchor.set_download(file_name);
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    Ok(())
}

/// Paints the certificate onto an off-screen canvas and returns it as a PNG data URL.
fn render_certificate(summary: &ShareSummary) -> Result<String, JsValue> {
    let document = window()
        .document()
        .ok_or_else(|| JsValue::from_str("document unavailable"))?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(JsValue::from)?;
    canvas.set_width(CERTIFICATE_IMAGE_WIDTH);
    canvas.set_height(CERTIFICATE_IMAGE_HEIGHT);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()
        .map_err(JsValue::from)?;

    let width = CERTIFICATE_IMAGE_WIDTH as f64;
    let height = CERTIFICATE_IMAGE_HEIGHT as f64;

    let gradient = ctx.create_linear_gradient(0.0, 0.0, width, height);
    gradient.add_color_stop(0.0, "#0a0118")?;
    gradient.add_color_stop(0.5, "#1a0b2e")?;
    gradient.add_color_stop(1.0, "#0a0118")?;
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_stroke_style_str("#00f2fe");
    ctx.set_line_width(8.0);
    ctx.set_shadow_blur(20.0);
    ctx.set_shadow_color("#00f2fe");
    ctx.stroke_rect(40.0, 40.0, width - 80.0, height - 80.0);
    ctx.set_shadow_blur(0.0);

    ctx.set_stroke_style_str("#4facfe");
    ctx.set_line_width(2.0);
    ctx.stroke_rect(60.0, 60.0, width - 120.0, height - 120.0);

    ctx.set_text_align("center");
    for line in share::certificate_layout(summary) {
        ctx.set_font(line.font);
        ctx.set_fill_style_str(line.color);
        ctx.fill_text(&line.text, width / 2.0, line.y)?;
    }

    canvas.to_data_url_with_type("image/png")
}

#[component]
fn ScoreHud() -> impl IntoView {
    let quest = use_quest();

    let reset = move |_| {
        let confirmed = window()
            .confirm_with_message("Reset all progress? This cannot be undone.")
            .unwrap_or(false);
        if confirmed {
            quest.apply(|store| store.reset().clone());
            quest.route.set(Route::Landing);
        }
    };

    view! {
        <aside class="hud">
            <div class="hud-item">
                <p class="label">"Score"</p>
                <p class="value">{move || quest.player.with(|player| player.score).to_string()}</p>
            </div>
            <div class="hud-item">
                <p class="label">"Ninja"</p>
                <p class="value">{move || quest.player.with(PlayerState::hud_label)}</p>
            </div>
            <button class="btn btn-ghost" type="button" title="Reset progress" on:click=reset>
                "Reset"
            </button>
        </aside>
    }
}

#[component]
fn SoundToggle() -> impl IntoView {
    let quest = use_quest();

    let toggle = move |_| {
        let muted = !quest.muted.get_untracked();
        quest.cues.update_value(|cues| cues.set_muted(muted));
        audio::save_muted(&mut BrowserStorage, muted);
        quest.muted.set(muted);
    };

    view! {
        <button class="pill sound-toggle" type="button" on:click=toggle>
            {move || if quest.muted.get() { "Sound off" } else { "Sound on" }}
        </button>
    }
}

/// Live chain figures, refreshed on the configured interval while mounted.
#[component]
fn LiveData(#[prop(optional)] highlight: Option<DataPoint>) -> impl IntoView {
    let quest = use_quest();
    let (snapshot, set_snapshot) = create_signal::<Option<ChainSnapshot>>(None);
    let reader = quest
        .config
        .with_value(|config| MetricsReader::new(config.clone()));
    let every = quest.config.with_value(|config| config.metrics_refresh);

    let refresh = move || {
        let reader = reader.clone();
        spawn_local(async move {
            let latest = reader.snapshot().await;
            let _ = set_snapshot.try_set(Some(latest));
        });
    };

    refresh();
    match set_interval_with_handle(refresh, every) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(error) => log::warn!("live data will not refresh: {:?}", error),
    }

    let tile = move |label: &'static str, point: DataPoint, value: fn(&ChainSnapshot) -> String| {
        view! {
            <div class="status-item" class:highlight={highlight == Some(point)}>
                <p class="label">{label}</p>
                <p class="value">
                    {move || {
                        snapshot.with(|latest| {
                            latest
                                .as_ref()
                                .map(value)
                                .unwrap_or_else(|| "...".to_string())
                        })
                    }}
                </p>
            </div>
        }
    };

    view! {
        <section class="status-panel">
            <p class="eyebrow">"Live Injective data"</p>
            {tile("Chain ID", DataPoint::ChainId, |latest| latest.block.chain_id.clone())}
            {tile("Block height", DataPoint::BlockHeight, |latest| {
                metrics::format_number(&latest.block.block_height)
            })}
            {tile("Block time", DataPoint::BlockTime, |latest| {
                metrics::format_block_time(&latest.block.block_time)
            })}
            {tile("Network", DataPoint::Network, |latest| latest.node.network.clone())}
            {tile("Validators", DataPoint::Validators, |latest| latest.validators.to_string())}
        </section>
    }
}

#[component]
fn ChapterCard(chapter: Chapter) -> impl IntoView {
    let quest = use_quest();
    let id = chapter.id;
    let max_score = chapter.max_score();
    let stored = store_value(chapter.clone());

    let unlocked = move || {
        stored.with_value(|chapter| quest.player.with(|player| chapter.is_unlocked_for(player)))
    };
    let completed = move || quest.player.with(|player| player.has_completed(id));
    let status = move || {
        if completed() {
            format!("Best {}/{}", quest.player.with(|player| player.best_score(id)), max_score)
        } else if unlocked() {
            "Ready".to_string()
        } else {
            "Locked".to_string()
        }
    };

    let open = move |_| {
        if unlocked() {
            quest.open_chapter(id);
        }
    };

    view! {
        <article
            class="chapter-card"
            class:locked=move || !unlocked()
            class:completed=completed
            data-color={chapter.color.clone()}
            data-icon={chapter.icon.clone()}
            on:click=open
        >
            <p class="eyebrow">{format!("Chapter {id}")}</p>
            <h3 class="chapter-title">{chapter.title.clone()}</h3>
            <p class="chapter-subtitle">{chapter.subtitle.clone()}</p>
            <p class="lede">{chapter.lore_intro.clone()}</p>
            <p class="chapter-status">{status}</p>
        </article>
    }
}

fn rank_badge(rank: usize) -> String {
    match rank {
        1 => "👑".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        _ => rank.to_string(),
    }
}

#[component]
fn Leaderboard(max_score: u32) -> impl IntoView {
    let quest = use_quest();

    let entries = move || {
        let mut entries = quest.player.with(leaderboard::generate);
        entries.truncate(VISIBLE_ENTRIES);
        entries
    };

    view! {
        <section class="leaderboard">
            <h2 class="section-title">"Ninja Leaderboard"</h2>
            <ol class="leaderboard-list">
                {move || {
                    entries()
                        .into_iter()
                        .map(|entry| {
                            view! {
                                <li class="leaderboard-entry" class:player=entry.is_player>
                                    <span class="rank">{rank_badge(entry.rank)}</span>
                                    <span class="name">{entry.name.clone()}</span>
                                    {entry
                                        .is_player
                                        .then(|| view! { <span class="you">"YOU"</span> })}
                                    <span class="score">{entry.score.to_string()}</span>
                                </li>
                            }
                        })
                        .collect_view()
                }}
            </ol>
            <p class="lede">{format!("Complete all chapters to reach {max_score} points.")}</p>
        </section>
    }
}

async fn copy_to_clipboard(text: &str) -> Result<(), JsValue> {
    let promise = window().navigator().clipboard().write_text(text);
    JsFuture::from(promise).await.map(|_| ())
}

#[component]
fn ShareMenu() -> impl IntoView {
    let quest = use_quest();

    let summary = move || quest.player.with(|player| quest.summary(player));
    let origin = move || quest.config.with_value(|config| page_origin(config.site_origin));

    let to_twitter = move |_| open_in_new_tab(&share::twitter_intent_url(&summary(), &origin()));
    let to_telegram = move |_| open_in_new_tab(&share::telegram_intent_url(&summary(), &origin()));

    let save_text = move |_| {
        let text = share::certificate_text(&summary());
        let href = format!(
            "data:text/plain;charset=utf-8,{}",
            share::encode_uri_component(&text)
        );
        let name = share::certificate_file_name(js_sys::Date::now() as u64, "txt");
        if let Err(error) = download(&href, &name) {
            log::warn!("certificate download failed: {:?}", error);
        }
    };

    let save_image = move |_| {
        let name = share::certificate_file_name(js_sys::Date::now() as u64, "png");
        let saved = render_certificate(&summary()).and_then(|href| download(&href, &name));
        if let Err(error) = saved {
            log::warn!("certificate image failed: {:?}", error);
        }
    };

    let (copied, set_copied) = create_signal(false);
    let copy = move |_| {
        let text = share::share_text(&summary(), &origin());
        spawn_local(async move {
            match copy_to_clipboard(&text).await {
                Ok(()) => {
                    set_copied.set(true);
                    set_timeout(
                        move || {
                            let _ = set_copied.try_set(false);
                        },
                        COPIED_NOTICE,
                    );
                }
                Err(error) => log::warn!("clipboard write failed: {:?}", error),
            }
        });
    };

    view! {
        <section class="share-menu">
            <h2 class="section-title">"Quest Complete!"</h2>
            <pre class="share-preview">{move || share::share_text(&summary(), &origin())}</pre>
            <div class="header-actions">
                <button class="btn" type="button" on:click=to_twitter>"Share on X"</button>
                <button class="btn" type="button" on:click=to_telegram>"Share on Telegram"</button>
                <button class="btn" type="button" on:click=copy>
                    {move || if copied.get() { "Copied!" } else { "Copy to Clipboard" }}
                </button>
                <button class="btn" type="button" on:click=save_text>
                    "Download text certificate"
                </button>
                <button class="btn btn-primary" type="button" on:click=save_image>
                    "Download certificate"
                </button>
            </div>
        </section>
    }
}

#[component]
fn Landing() -> impl IntoView {
    let quest = use_quest();
    let chapters = quest.catalog.with_value(|catalog| catalog.chapters().to_vec());
    let (chapter_count, question_count, max_score) = quest.catalog.with_value(|catalog| {
        (catalog.len(), catalog.question_count(), catalog.max_total_score())
    });

    let begin = move |_| {
        quest.play(Cue::Click);
        quest.apply(|store| store.begin(None).clone());
    };

    let started = move || quest.player.with(|player| player.quest_started);
    let finished = move || {
        quest
            .catalog
            .with_value(|catalog| quest.player.with(|player| catalog.is_fully_completed(player)))
    };

    view! {
        <header class="page-header hero">
            <div>
                <p class="eyebrow">"Ninja Labs"</p>
                <h1 class="headline">"Injective Ninja Quest"</h1>
                <p class="lede">"Master the Injective blockchain, one chapter at a time."</p>
            </div>
            <div class="header-actions">
                {move || {
                    if started() {
                        view! { <p class="pill">"Quest in progress. Pick a chapter below."</p> }
                            .into_view()
                    } else {
                        view! {
                            <button class="btn btn-primary" type="button" on:click=begin>
                                "Begin Your Quest"
                            </button>
                        }
                        .into_view()
                    }
                }}
                <button
                    class="btn"
                    type="button"
                    disabled=true
                    title="Wallet connection is not available yet"
                >
                    "Connect wallet (coming soon)"
                </button>
            </div>
            <div class="status-panel">
                <div class="status-item">
                    <p class="label">"Chapters"</p>
                    <p class="value">{chapter_count.to_string()}</p>
                </div>
                <div class="status-item">
                    <p class="label">"Questions"</p>
                    <p class="value">{question_count.to_string()}</p>
                </div>
                <div class="status-item">
                    <p class="label">"Max score"</p>
                    <p class="value">{max_score.to_string()}</p>
                </div>
            </div>
        </header>

        <LiveData />

        <section class="chapter-grid">
            {chapters
                .into_iter()
                .map(|chapter| view! { <ChapterCard chapter=chapter /> })
                .collect_view()}
        </section>

        <Leaderboard max_score=max_score />

        <Show when=finished>
            <ShareMenu />
        </Show>
    }
}

#[component]
fn QuizPanel(
    session: RwSignal<Option<QuizSession>>,
    reveal: RwSignal<Option<AnswerReveal>>,
    on_select: Callback<usize>,
    on_confirm: Callback<()>,
    on_advance: Callback<()>,
) -> impl IntoView {
    let question = create_memo(move |_| {
        session.with(|session| session.as_ref().map(|session| session.current_question().clone()))
    });
    let counter = move || {
        session.with(|session| {
            session
                .as_ref()
                .map(|session| {
                    format!(
                        "Question {} of {}",
                        session.current_index() + 1,
                        session.total_questions()
                    )
                })
                .unwrap_or_default()
        })
    };
    let points = move || {
        let points = session.with(|session| session.as_ref().map_or(0, QuizSession::points));
        format!("+{points} pts")
    };
    let progress = move || {
        let percent =
            session.with(|session| session.as_ref().map_or(0.0, QuizSession::progress_percent));
        format!("{percent:.0}%")
    };
    let selected = move || session.with(|session| session.as_ref().and_then(QuizSession::selected));
    let is_last = move || {
        session.with(|session| session.as_ref().is_some_and(QuizSession::is_last_question))
    };

    view! {
        <section class="quiz-card">
            <div class="quiz-meta">
                <span class="eyebrow">{counter}</span>
                <span class="points">{points}</span>
            </div>
            <div class="progress-track">
                <div class="progress-fill" style:width=progress></div>
            </div>
            {move || {
                question
                    .get()
                    .map(|question: Question| {
                        view! {
                            <div class="prompt-area">
                                <p class="prompt">{question.prompt.clone()}</p>
                            </div>
                            <div class="options-grid">
                                {question
                                    .options
                                    .iter()
                                    .enumerate()
                                    .map(|(index, option)| {
                                        let status = move || match reveal.get() {
                                            Some(shown) if index == shown.correct_answer => {
                                                "option correct"
                                            }
                                            Some(shown) if index == shown.selected => {
                                                "option wrong"
                                            }
                                            Some(_) => "option",
                                            None if selected() == Some(index) => "option selected",
                                            None => "option",
                                        };

                                        view! {
                                            <button
                                                class=status
                                                type="button"
                                                disabled=move || reveal.with(Option::is_some)
                                                on:click=move |_| on_select.call(index)
                                            >
                                                <span class="option-index">
                                                    {Question::option_label(index).to_string()}
                                                </span>
                                                <span class="option-body">{option.clone()}</span>
                                            </button>
                                        }
                                    })
                                    .collect_view()}
                            </div>
                        }
                    })
            }}
            {move || {
                reveal
                    .get()
                    .map(|shown| {
                        view! {
                            <div
                                class="explanation"
                                class:correct=shown.is_correct
                                class:wrong={!shown.is_correct}
                            >
                                <p class="verdict">
                                    {if shown.is_correct { "Correct!" } else { "Not quite." }}
                                </p>
                                <p class="lede">{shown.explanation.clone()}</p>
                                {shown
                                    .is_correct
                                    .then(|| {
                                        let bonus = format!("+{POINTS_PER_CORRECT_ANSWER} points");
                                        view! { <p class="bonus">{bonus}</p> }
                                    })}
                            </div>
                        }
                    })
            }}
            <div class="overlay-actions">
                {move || {
                    if reveal.with(Option::is_some) {
                        let label = if is_last() { "Complete chapter" } else { "Next question" };
                        view! {
                            <button
                                class="btn btn-primary"
                                type="button"
                                on:click=move |_| on_advance.call(())
                            >
                                {label}
                            </button>
                        }
                        .into_view()
                    } else {
                        view! {
                            <button
                                class="btn btn-primary"
                                type="button"
                                disabled=move || selected().is_none()
                                on:click=move |_| on_confirm.call(())
                            >
                                "Confirm answer"
                            </button>
                        }
                        .into_view()
                    }
                }}
            </div>
        </section>
    }
}

#[component]
fn ChapterView(chapter_id: u32) -> impl IntoView {
    let quest = use_quest();

    let found = quest.catalog.with_value(|catalog| {
        catalog.chapter_by_id(chapter_id).ok().cloned()
    });
    let Some(chapter) = found.filter(|chapter| {
        quest.player.with_untracked(|player| chapter.is_unlocked_for(player))
    }) else {
        log::warn!("chapter {chapter_id} is unknown or locked");
        request_animation_frame(move || quest.route.set(Route::Landing));
        return ().into_view();
    };

    let title = chapter.title.clone();
    let data_point = chapter.data_point;
    let stored = store_value(chapter.clone());

    let phase = create_rw_signal(ChapterPhase::Story);
    let session = create_rw_signal::<Option<QuizSession>>(None);
    let reveal = create_rw_signal::<Option<AnswerReveal>>(None);

    let back = move |_| {
        quest.play(Cue::Click);
        quest.route.set(Route::Landing);
    };

    let start_quiz = move |_| match stored.with_value(QuizSession::new) {
        Ok(fresh) => {
            quest.play(Cue::Click);
            reveal.set(None);
            session.set(Some(fresh));
            phase.set(ChapterPhase::Quiz);
        }
        Err(error) => log::error!("{error}"),
    };

    let choose_option = Callback::new(move |index: usize| {
        session.update(|session| {
            if let Some(session) = session {
                session.select_option(index);
            }
        });
    });

    let confirm_answer = Callback::new(move |_| {
        let mut revealed = None;
        session.update(|session| {
            if let Some(session) = session {
                revealed = session.confirm();
            }
        });

        if let Some(shown) = revealed {
            quest.play(if shown.is_correct { Cue::Correct } else { Cue::Incorrect });
            reveal.set(Some(shown));
        }
    });

    let advance = Callback::new(move |_| {
        let Some(mut current) = session.get_untracked() else {
            return;
        };
        let step = quest
            .store
            .try_update_value(|store| current.advance(store))
            .unwrap_or(Advance::Ignored);
        session.set(Some(current));

        match step {
            Advance::Ignored => {}
            Advance::NextQuestion { .. } => reveal.set(None),
            Advance::Finished(outcome) => {
                let state = quest.store.with_value(|store| store.read().clone());
                quest.player.set(state);
                quest.play(Cue::ChapterComplete);
                phase.set(ChapterPhase::Complete(outcome));
            }
        }
    });

    view! {
        <header class="page-header">
            <div>
                <p class="eyebrow">{format!("Chapter {chapter_id}")}</p>
                <h1 class="headline">{chapter.title.clone()}</h1>
                <p class="lede">{chapter.subtitle.clone()}</p>
            </div>
            <div class="header-actions">
                <button class="btn" type="button" on:click=back>"Back to chapters"</button>
            </div>
        </header>

        <LiveData highlight=data_point />

        {move || match phase.get() {
            ChapterPhase::Story => {
                view! {
                    <section class="story-card">
                        {stored
                            .with_value(|chapter| {
                                chapter
                                    .story_paragraphs()
                                    .map(|paragraph| {
                                        view! { <p class="lede">{paragraph.to_string()}</p> }
                                    })
                                    .collect_view()
                            })}
                        <button class="btn btn-primary" type="button" on:click=start_quiz>
                            "Start the challenge"
                        </button>
                    </section>
                }
                .into_view()
            }
            ChapterPhase::Quiz => {
                view! {
                    <QuizPanel
                        session=session
                        reveal=reveal
                        on_select=choose_option
                        on_confirm=confirm_answer
                        on_advance=advance
                    />
                }
                .into_view()
            }
            ChapterPhase::Complete(outcome) => {
                view! {
                    <section class="result-card">
                        <p class="eyebrow">"Chapter complete!"</p>
                        <p class="result-subtitle">{format!("You have mastered {title}")}</p>
                        <p class="result-score">{format!("+{}", outcome.score)}</p>
                        <p class="label">"Points earned"</p>
                        {outcome
                            .is_perfect
                            .then(|| view! { <p class="bonus">"Perfect chapter bonus!"</p> })}
                        <button class="btn btn-primary" type="button" on:click=back>
                            "Continue the quest"
                        </button>
                    </section>
                }
                .into_view()
            }
        }}
    }
    .into_view()
}

#[component]
fn QuestApp(catalog: Catalog) -> impl IntoView {
    let config = QuestConfig::default();
    let store = ProgressStore::new(BrowserStorage, config.storage_key);
    let muted = audio::load_muted(&BrowserStorage);
    let mut cues = CuePlayer::new();
    cues.set_muted(muted);
    let quest = QuestState {
        player: create_rw_signal(store.read().clone()),
        catalog: store_value(catalog),
        store: store_value(store),
        cues: store_value(cues),
        config: store_value(config.clone()),
        route: create_rw_signal(Route::Landing),
        muted: create_rw_signal(muted),
    };
    provide_context(quest);

    // Browsers only allow audio after a user gesture.
    let start_music = move || quest.cues.update_value(|cues| cues.start_ambient());
    let on_click = window_event_listener(ev::click, move |_| start_music());
    let on_key = window_event_listener(ev::keydown, move |_| start_music());
    on_cleanup(move || {
        on_click.remove();
        on_key.remove();
        let _ = quest.cues.try_update_value(|cues| cues.stop_ambient());
    });

    // Picks up progress written by other tabs.
    let poll = move || {
        if let Some(latest) = quest.store.try_update_value(|store| store.reload().clone()) {
            if quest.player.with_untracked(|player| *player != latest) {
                quest.player.set(latest);
            }
        }
    };
    match set_interval_with_handle(poll, config.progress_refresh) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(error) => log::warn!("progress polling disabled: {:?}", error),
    }

    view! {
        <div class="app-toolbar">
            <Show when=move || quest.player.with(|player| player.quest_started)>
                <ScoreHud />
            </Show>
            <SoundToggle />
        </div>
        {move || match quest.route.get() {
            Route::Landing => view! { <Landing /> }.into_view(),
            Route::Chapter(id) => view! { <ChapterView chapter_id=id /> }.into_view(),
        }}
    }
}

#[component]
fn App() -> impl IntoView {
    let content = match Catalog::builtin() {
        Ok(catalog) => view! { <QuestApp catalog=catalog /> }.into_view(),
        Err(error) => {
            log::error!("chapter content failed to load: {error}");
            view! {
                <section class="error-card">
                    <p class="eyebrow">"Content error"</p>
                    <p class="error-body">{error.to_string()}</p>
                </section>
            }
            .into_view()
        }
    };

    view! { <main class="page">{content}</main> }
}

/// Installs the console logger and panic hook, then mounts the quest.
pub fn mount() {
    console_error_panic_hook::set_once();
    init_logging();
    mount_to_body(|| view! { <App /> });
}
