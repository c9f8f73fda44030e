//! 카드 게임 규칙 엔진.
//!
//! 엔티티 레지스트리, 자원 모디파이어 체인, 이벤트 버스, 턴 엔진으로 구성된다.
//! 구체적인 카드 규칙은 [`content::RulePack`] 으로 외부에서 주입한다.

pub mod content;
pub mod ecs;
pub mod error;
pub mod events;
pub mod game;
pub mod resources;

pub use content::RulePack;
pub use ecs::{EntityId, EntityRegistry, EntityView};
pub use error::{ContentError, GameError, GameResult};
pub use events::{EventBus, EventHandler, EventName, GameEvent, TURN_END, TURN_START};
pub use game::{
    action::{ActionContext, ActionInfo, ActionInvocation, TargetRule, TargetSet, UsableAction},
    listener::keys,
    zone::ZonePosition,
    Game, GameConfig, StateChange, StateChangeListener,
};
pub use resources::{EcsResource, EntityModifier, FnModifier, ModifierSwitch};
