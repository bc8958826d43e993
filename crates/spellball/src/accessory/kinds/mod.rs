//! Built-in accessories.

mod burning;
mod explosive;
mod gravity;
mod halo;
mod healing;
mod heavy;
mod pulse;
mod spawner;
mod speedy;
mod spikes;
mod wings;
mod zap;

pub use burning::Burning;
pub use explosive::Explosive;
pub use gravity::GravityWell;
pub use halo::Halo;
pub use healing::HealingAura;
pub use heavy::Heavy;
pub use pulse::Pulse;
pub use spawner::{find_spawn_position, Spawner};
pub use speedy::Speedy;
pub use spikes::Spikes;
pub use wings::Wings;
pub use zap::Zap;

use super::{Accessory, AccessoryId, AccessoryRegistry};

pub const GRAVITY: AccessoryId = "gravity";
pub const HEALING: AccessoryId = "healing";
pub const PULSE: AccessoryId = "pulse";
pub const ZAP: AccessoryId = "zap";
pub const BURNING: AccessoryId = "burning";
pub const SPAWNER: AccessoryId = "spawner";
pub const SPEEDY: AccessoryId = "speedy";
pub const EXPLOSIVE: AccessoryId = "explosive";
pub const WINGS: AccessoryId = "wings";
pub const HEAVY: AccessoryId = "heavy";
pub const SPIKES: AccessoryId = "spikes";
pub const HALO: AccessoryId = "halo";

fn make<T: Accessory + Default + 'static>() -> Box<dyn Accessory> {
    Box::new(T::default())
}

pub fn register_builtins(registry: &mut AccessoryRegistry) {
    let builtins: [(AccessoryId, fn() -> Box<dyn Accessory>); 12] = [
        (GRAVITY, make::<GravityWell>),
        (HEALING, make::<HealingAura>),
        (PULSE, make::<Pulse>),
        (ZAP, make::<Zap>),
        (BURNING, make::<Burning>),
        (SPAWNER, make::<Spawner>),
        (SPEEDY, make::<Speedy>),
        (EXPLOSIVE, make::<Explosive>),
        (WINGS, make::<Wings>),
        (HEAVY, make::<Heavy>),
        (SPIKES, make::<Spikes>),
        (HALO, make::<Halo>),
    ];
    for (id, factory) in builtins {
        registry.register_factory(id, factory);
    }
}
