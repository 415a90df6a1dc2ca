use adsweeper_core as engine;
use clap::ValueEnum;
use gloo::timers::callback::Timeout;
use yew::prelude::*;

use crate::audio;
use crate::utils::*;

/// Every kind in the shipped catalog points at the same clip, as does the
/// win screen.
const VIDEO_ID: &str = "dQw4w9WgXcQ";

const WIN_MODAL_DELAY_MS: u32 = 500;
const LOSS_MODAL_DELAY_MS: u32 = 1_000;

const KINDS: &[(&str, &str)] = &[
    ("Red Ad", "red"),
    ("Blue Ad", "blue"),
    ("Green Ad", "green"),
    ("Orange Ad", "orange"),
    ("Yellow Ad", "yellow"),
    ("Pink Ad", "pink"),
    ("Cyan Ad", "cyan"),
    ("Gray Ad", "gray"),
    ("Coral Ad", "coral"),
    ("Teal Ad", "teal"),
    ("Brown Ad", "brown"),
];

fn default_catalog() -> engine::MineCatalog {
    engine::MineCatalog::new(
        KINDS
            .iter()
            .map(|&(label, color)| engine::MineKind::new(label, color, VIDEO_ID))
            .collect(),
    )
}

/// The two shipped board variants: a one-ad board and an eleven-ad board.
/// Both use the reachable win condition; the dense variant's legacy
/// mines-found check survives in the engine behind
/// `WinCondition::AllMinesRevealed`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Mode {
    #[default]
    Single,
    Swarm,
}

impl Mode {
    const BOARD_SIZE: engine::Coord = 5;

    fn mine_count(self) -> engine::CellCount {
        match self {
            Self::Single => 1,
            Self::Swarm => 11,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Single => "1 ad",
            Self::Swarm => "11 ads",
        }
    }

    fn config(self) -> engine::GameConfig {
        engine::GameConfig {
            size: Self::BOARD_SIZE,
            mines: self.mine_count(),
            win_condition: engine::WinCondition::AllSafeRevealed,
        }
    }
}

const fn count_label(
    count: engine::CellCount,
    singular: &'static str,
    plural: &'static str,
) -> &'static str {
    if count == 1 { singular } else { plural }
}

fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}?autoplay=1")
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ModalContent {
    Loss {
        label: String,
        color: String,
        video_id: String,
    },
    Win,
}

struct ModalCopy {
    title: String,
    subtitle: String,
    video_id: String,
    accent: Option<String>,
}

fn modal_copy(content: &ModalContent) -> ModalCopy {
    match content {
        ModalContent::Win => ModalCopy {
            title: "🎉 Congratulations! You've collected every subscriber!".into(),
            subtitle: "However, you still need a good editor!".into(),
            video_id: VIDEO_ID.into(),
            accent: None,
        },
        ModalContent::Loss {
            label,
            color,
            video_id,
        } => ModalCopy {
            title: format!("💥 {label} found!"),
            subtitle: "You lost all your subscribers... to get them back, you need to work with a good editor!"
                .into(),
            video_id: video_id.clone(),
            accent: Some(color.clone()),
        },
    }
}

#[derive(Clone, Debug, PartialEq)]
enum ViewCell {
    Hidden,
    Flagged,
    Safe,
    Mine { color: String, triggered: bool },
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    row: engine::Coord,
    col: engine::Coord,
    view: ViewCell,
    on_reveal: Callback<engine::Coord2>,
    on_flag: Callback<engine::Coord2>,
}

#[function_component(CellView)]
fn cell_component(props: &CellProps) -> Html {
    use ViewCell::*;

    let CellProps {
        row,
        col,
        view,
        on_reveal,
        on_flag,
    } = props.clone();

    let (class, glyph) = match &view {
        Hidden => (classes!("cell"), ""),
        Flagged => (classes!("cell", "flagged"), "🚩"),
        Safe => (classes!("cell", "revealed"), "💎"),
        Mine { color, triggered } => {
            let mut class = classes!("cell", "revealed", "mine", format!("mine-{color}"));
            if *triggered {
                class.push("oops");
            }
            (class, "💣")
        }
    };

    let onclick = Callback::from(move |_: MouseEvent| on_reveal.emit((row, col)));
    let oncontextmenu = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        on_flag.emit((row, col));
    });

    html! {
        <div {class} {onclick} {oncontextmenu}>{ glyph }</div>
    }
}

#[derive(Properties, Clone, PartialEq)]
struct VideoModalProps {
    content: ModalContent,
    on_close: Callback<()>,
}

#[function_component(VideoModal)]
fn video_modal(props: &VideoModalProps) -> Html {
    let VideoModalProps { content, on_close } = props.clone();
    let copy = modal_copy(&content);

    let close_backdrop = {
        let on_close = on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let close_button = Callback::from(move |_: MouseEvent| on_close.emit(()));
    let keep_open = Callback::from(|e: MouseEvent| e.stop_propagation());

    let mut class = classes!("modal");
    if let Some(accent) = &copy.accent {
        class.push(format!("modal-{accent}"));
    }

    html! {
        <BodyPortal>
            <div class="modal-backdrop" onclick={close_backdrop}>
                <div {class} onclick={keep_open}>
                    <button class="modal-close" onclick={close_button}>{ "×" }</button>
                    <h2>{ copy.title }</h2>
                    <p>{ copy.subtitle }</p>
                    <iframe
                        src={embed_url(&copy.video_id)}
                        title="result video"
                        allow="autoplay; encrypted-media"
                        allowfullscreen={true}
                    />
                </div>
            </div>
        </BodyPortal>
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Reveal(engine::Coord2),
    Flag(engine::Coord2),
    NewGame,
    SetMode(Mode),
    ShowModal(ModalContent),
    CloseModal,
}

#[derive(Properties, Clone, Debug, PartialEq)]
pub(crate) struct GameProps {
    #[prop_or_default]
    pub seed: Option<u64>,
    #[prop_or_default]
    pub mode: Mode,
}

pub(crate) struct GameView {
    mode: Mode,
    board: engine::BoardEngine,
    modal: Option<ModalContent>,
    pending_modal: Option<Timeout>,
}

impl GameView {
    fn start_new_round(&mut self) {
        let seed = js_random_seed();
        self.pending_modal = None;
        self.modal = None;
        if let Err(err) = self
            .board
            .reset(self.mode.config(), engine::RandomLayoutGenerator::new(seed))
        {
            log::error!("could not start a new round: {err}");
        }
        log::debug!("new round: {:?}, seed {}", self.mode, seed);
    }

    fn react(&mut self, ctx: &Context<Self>, outcome: engine::RevealOutcome) {
        use engine::RevealOutcome::*;

        match outcome {
            Ignored => {}
            Revealed => audio::play(audio::Cue::Pop),
            HitMine(kind) => {
                audio::play(audio::Cue::Boom);
                self.schedule_modal(ctx, self.loss_content(kind), LOSS_MODAL_DELAY_MS);
            }
            Won => {
                audio::play(audio::Cue::Pop);
                self.schedule_modal(ctx, ModalContent::Win, WIN_MODAL_DELAY_MS);
            }
        }
    }

    fn schedule_modal(&mut self, ctx: &Context<Self>, content: ModalContent, delay_ms: u32) {
        let link = ctx.link().clone();
        self.pending_modal = Some(Timeout::new(delay_ms, move || {
            link.send_message(Msg::ShowModal(content));
        }));
    }

    fn loss_content(&self, kind: engine::KindId) -> ModalContent {
        match self.board.kind_details(kind) {
            Some(details) => ModalContent::Loss {
                label: details.label.clone(),
                color: details.color.clone(),
                video_id: details.content_id.clone(),
            },
            None => ModalContent::Loss {
                label: "Ad".to_string(),
                color: "red".to_string(),
                video_id: VIDEO_ID.to_string(),
            },
        }
    }

    fn view_cell(&self, coords: engine::Coord2) -> ViewCell {
        match self.board.cell_at(coords) {
            engine::CellState::Hidden => ViewCell::Hidden,
            engine::CellState::Flagged => ViewCell::Flagged,
            engine::CellState::Revealed if self.board.has_mine_at(coords) => ViewCell::Mine {
                color: self.kind_color(coords),
                triggered: self.board.triggered_mine() == Some(coords),
            },
            engine::CellState::Revealed => ViewCell::Safe,
        }
    }

    fn kind_color(&self, coords: engine::Coord2) -> String {
        self.board
            .kind_at(coords)
            .and_then(|id| self.board.kind_details(id))
            .map(|kind| kind.color.clone())
            .unwrap_or_else(|| "red".to_string())
    }

    fn phase_class(&self) -> &'static str {
        match self.board.phase() {
            engine::GamePhase::NotStarted => "not-started",
            engine::GamePhase::InProgress => "in-progress",
            engine::GamePhase::Won => "win",
            engine::GamePhase::Lost => "lose",
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let seed = props.seed.unwrap_or_else(js_random_seed);
        let mode = props.mode;
        let board = engine::BoardEngine::new(
            mode.config(),
            default_catalog(),
            engine::RandomLayoutGenerator::new(seed),
        )
        .expect("mode presets fit the board");

        log::debug!("new round: {:?}, seed {}", mode, seed);
        Self {
            mode,
            board,
            modal: None,
            pending_modal: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Reveal(coords) => match self.board.reveal(coords) {
                Ok(outcome) => {
                    self.react(ctx, outcome);
                    outcome.has_update()
                }
                Err(err) => {
                    log::error!("reveal {coords:?} rejected: {err}");
                    false
                }
            },
            Flag(coords) => match self.board.toggle_flag(coords) {
                Ok(outcome) => outcome.has_update(),
                Err(err) => {
                    log::error!("flag {coords:?} rejected: {err}");
                    false
                }
            },
            NewGame => {
                self.start_new_round();
                true
            }
            SetMode(mode) => {
                if self.mode == mode {
                    return false;
                }
                self.mode = mode;
                self.start_new_round();
                true
            }
            ShowModal(content) => {
                self.pending_modal = None;
                self.modal = Some(content);
                true
            }
            CloseModal => self.modal.take().is_some(),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let size = self.board.size();
        let score = self.board.score();
        let mines = self.board.total_mines();

        let on_reveal = ctx.link().callback(Msg::Reveal);
        let on_flag = ctx.link().callback(Msg::Flag);
        let on_new_game = ctx.link().callback(|_: MouseEvent| Msg::NewGame);
        let on_close = ctx.link().callback(|()| Msg::CloseModal);

        html! {
            <div
                class={classes!("adsweeper", self.phase_class())}
                oncontextmenu={Callback::from(|e: MouseEvent| e.prevent_default())}
            >
                <nav>
                    <aside class="score">
                        { score }{ " " }{ count_label(score, "subscriber", "subscribers") }
                    </aside>
                    <button class="new-game" onclick={on_new_game}>{ "New Game" }</button>
                    <aside class="mines">
                        { mines }{ " " }{ count_label(mines, "ad", "ads") }
                    </aside>
                </nav>
                <div class="modes">
                    { for [Mode::Single, Mode::Swarm].into_iter().map(|mode| {
                        let onclick = ctx.link().callback(move |_: MouseEvent| Msg::SetMode(mode));
                        let class = classes!("mode", (self.mode == mode).then_some("active"));
                        html! { <button {class} {onclick}>{ mode.title() }</button> }
                    }) }
                </div>
                <div
                    class="board"
                    style={format!("grid-template-columns: repeat({size}, var(--cell-size))")}
                >
                    { for (0..size).flat_map(|row| (0..size).map(move |col| (row, col))).map(|coords| {
                        html! {
                            <CellView
                                row={coords.0}
                                col={coords.1}
                                view={self.view_cell(coords)}
                                on_reveal={on_reveal.clone()}
                                on_flag={on_flag.clone()}
                            />
                        }
                    }) }
                </div>
                if let Some(content) = &self.modal {
                    <VideoModal content={content.clone()} on_close={on_close} />
                }
            </div>
        }
    }
}
