use rand::{rngs::SmallRng, SeedableRng};
use wasm_bindgen::prelude::*;

pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod game;
pub mod hand;
mod logging;

pub use card::{Card, Rank, Suit};
pub use config::{parse_table_input, to_table_rules, RulesInput, TableInput, TableRules};
pub use deck::Deck;
pub use error::{GameError, Result};
pub use game::{resolve, BlackjackGame, GameStatus, HandView, RoundSnapshot};
pub use hand::{classify, evaluate, Hand, HandClass, Totals};

/// A single-player table driven from JavaScript.
#[wasm_bindgen]
pub struct BlackjackTable {
    game: BlackjackGame<SmallRng>,
}

#[wasm_bindgen]
impl BlackjackTable {
    #[wasm_bindgen(constructor)]
    pub fn new(params: &JsValue) -> std::result::Result<BlackjackTable, JsValue> {
        console_error_panic_hook::set_once();
        let input: TableInput = serde_wasm_bindgen::from_value(params.clone())
            .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?;

        let level = input.log_level().map_err(to_js_error)?;
        logging::init(level);

        let rng = match input.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let rules = to_table_rules(&input);
        let game = BlackjackGame::with_rules(rng, input.num_decks, rules).map_err(to_js_error)?;
        Ok(BlackjackTable { game })
    }

    pub fn deal(&mut self) -> std::result::Result<JsValue, JsValue> {
        self.game.deal().map_err(to_js_error)?;
        self.snapshot()
    }

    pub fn hit(&mut self) -> std::result::Result<JsValue, JsValue> {
        self.game.player_hit().map_err(to_js_error)?;
        self.snapshot()
    }

    pub fn stand(&mut self) -> std::result::Result<JsValue, JsValue> {
        self.game.player_stand().map_err(to_js_error)?;
        self.snapshot()
    }

    pub fn set_bet(&mut self, amount: u32) -> std::result::Result<JsValue, JsValue> {
        self.game.set_bet(amount).map_err(to_js_error)?;
        self.snapshot()
    }

    pub fn set_account(&mut self, amount: i32) -> std::result::Result<JsValue, JsValue> {
        self.game.set_account(i64::from(amount));
        self.snapshot()
    }

    pub fn snapshot(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.game.snapshot())
            .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
    }
}

fn to_js_error(err: GameError) -> JsValue {
    JsValue::from_str(&format!("Table error: {err}"))
}
