use grid_tactics_core::TurnPhase;

/// Two-phase turn cycle that starts with the player.
///
/// Transitions are caller-driven and never validated beyond the rule that only
/// a player turn can be ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TurnManager {
    current: TurnPhase,
}

impl TurnManager {
    /// Creates a manager positioned at the start of a player turn.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase that currently owns the turn.
    #[must_use]
    pub const fn current(&self) -> TurnPhase {
        self.current
    }

    /// Reports whether the player may act.
    #[must_use]
    pub const fn is_player_turn(&self) -> bool {
        matches!(self.current, TurnPhase::Player)
    }

    /// Hands the turn to the enemies; does nothing outside a player turn.
    pub fn end_player_turn(&mut self) {
        if self.is_player_turn() {
            self.current = TurnPhase::Enemy;
        }
    }

    /// Returns the turn to the player.
    pub fn start_player_turn(&mut self) {
        self.current = TurnPhase::Player;
    }

    /// Forces an enemy turn; used when restoring a snapshot.
    pub fn start_enemy_turn(&mut self) {
        self.current = TurnPhase::Enemy;
    }
}
