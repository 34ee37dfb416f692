//! Menu hitboxes: on-screen rectangles turned into static colliders.
//!
//! Every menu element becomes a label slab and a static box body. The body is
//! created once, up front, and only joins the simulation while the pointer is
//! over its element, so hovering a label makes the balls bump into it.

use std::collections::BTreeMap;

use cgmath::{Vector2, Vector3};

use crate::{
    config::{MenuConfig, MenuItem},
    data_structures::instance::{Instance, InstanceRaw},
    physics::{BodyDescriptor, BodyHandle, Shape, World},
};

/// Stable key of a menu element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HitboxId(pub u32);

impl std::fmt::Display for HitboxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hitbox#{}", self.0)
    }
}

/// Bounding rectangle of an element in logical pixels, origin top left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementRect {
    /// A rect is usable when every component is finite and the size is not
    /// negative.
    pub fn is_readable(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

/// Size of the viewport in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelStyle {
    #[default]
    Primary,
    /// Secondary label: smaller text, shifted down to line up with the page.
    Sub,
}

/// What the page (or the configuration) tells us about one menu element.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuElement {
    pub id: HitboxId,
    pub label: String,
    pub style: LabelStyle,
    /// `None` when the element has no layout, e.g. it is detached.
    pub rect: Option<ElementRect>,
}

impl MenuElement {
    /// Elements for builds without a page, numbered in order.
    pub fn from_items(items: &[MenuItem]) -> Vec<MenuElement> {
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| MenuElement {
                id: HitboxId(idx as u32),
                label: item.label.clone(),
                style: if item.sub {
                    LabelStyle::Sub
                } else {
                    LabelStyle::Primary
                },
                rect: Some(ElementRect {
                    left: item.left,
                    top: item.top,
                    width: item.width,
                    height: item.height,
                }),
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hitbox {
    pub id: HitboxId,
    pub label: String,
    pub style: LabelStyle,
    pub text_size: f32,
    /// Lower left corner of the label in scene units.
    pub origin: Vector3<f32>,
    pub size: Vector2<f32>,
    /// The rect as read from the page, used for hit tests.
    pub screen: ElementRect,
    pub body: BodyHandle,
}

impl Hitbox {
    /// Centre of the collider.
    pub fn centre(&self) -> Vector3<f32> {
        self.origin + Vector3::new(self.size.x / 2.0, self.size.y / 2.0, 0.0)
    }
}

/// Notification for the stage when a hitbox gains or loses the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEvent {
    Enter(HitboxId),
    Leave(HitboxId),
}

impl MenuEvent {
    pub fn id(&self) -> HitboxId {
        match self {
            MenuEvent::Enter(id) | MenuEvent::Leave(id) => *id,
        }
    }

    /// Name of the matching DOM event.
    pub fn name(&self) -> &'static str {
        match self {
            MenuEvent::Enter(_) => "enter",
            MenuEvent::Leave(_) => "leave",
        }
    }
}

#[derive(Debug, Default)]
pub struct Menu {
    hitboxes: BTreeMap<HitboxId, Hitbox>,
    label_colour: [f32; 4],
    label_depth: f32,
}

impl Menu {
    /// Builds one hitbox per element with a readable rect.
    ///
    /// Scene coordinates put the origin at the centre of the viewport with y
    /// pointing up: `x = left - W/2`, `y = H/2 - top - height`. Colliders are
    /// created in `world` but not added to the simulation.
    pub fn build_from_elements(
        world: &mut World,
        elements: &[MenuElement],
        viewport: Viewport,
        config: &MenuConfig,
    ) -> Self {
        let mut hitboxes = BTreeMap::new();
        for element in elements {
            let Some(screen) = element.rect.filter(ElementRect::is_readable) else {
                log::debug!("skipping {} ({:?}): no layout", element.id, element.label);
                continue;
            };
            if hitboxes.contains_key(&element.id) {
                log::warn!("duplicate menu element {}, keeping the first", element.id);
                continue;
            }

            let (top, text_size) = match element.style {
                LabelStyle::Sub => (screen.top + config.sub_offset, config.sub_text_size),
                LabelStyle::Primary => (screen.top, config.primary_text_size),
            };
            let x = screen.left - viewport.width / 2.0;
            let y = viewport.height / 2.0 - top - screen.height;
            let (half_w, half_h) = (screen.width / 2.0, screen.height / 2.0);

            let body = world.create_body(
                BodyDescriptor::fixed(
                    Vector3::new(x + half_w, y + half_h, 0.0),
                    Shape::Box {
                        half_extents: Vector3::new(half_w, half_h, config.depth_half_extent),
                    },
                )
                .with_material(config.material),
            );

            hitboxes.insert(
                element.id,
                Hitbox {
                    id: element.id,
                    label: element.label.clone(),
                    style: element.style,
                    text_size,
                    origin: Vector3::new(x, y, 0.0),
                    size: Vector2::new(screen.width, screen.height),
                    screen,
                    body,
                },
            );
        }
        log::info!("built {} menu hitboxes", hitboxes.len());

        Self {
            hitboxes,
            label_colour: config.label_colour,
            label_depth: config.label_depth,
        }
    }

    /// Adds the hitbox's collider to the simulation.
    pub fn on_pointer_enter(&self, world: &mut World, id: HitboxId) -> Option<MenuEvent> {
        let hitbox = self.hitboxes.get(&id)?;
        world.add_body(hitbox.body);
        Some(MenuEvent::Enter(id))
    }

    /// Takes the hitbox's collider out of the simulation.
    pub fn on_pointer_leave(&self, world: &mut World, id: HitboxId) -> Option<MenuEvent> {
        let hitbox = self.hitboxes.get(&id)?;
        world.remove_body(hitbox.body);
        Some(MenuEvent::Leave(id))
    }

    /// Returns whether the click hit a menu element and should not navigate.
    pub fn on_click(&self, id: HitboxId) -> bool {
        let known = self.hitboxes.contains_key(&id);
        if known {
            log::debug!("click on {id}");
        }
        known
    }

    /// Hitbox whose element covers the screen point `(x, y)`.
    pub fn element_at(&self, x: f32, y: f32) -> Option<HitboxId> {
        self.hitboxes
            .values()
            .find(|hitbox| hitbox.screen.contains(x, y))
            .map(|hitbox| hitbox.id)
    }

    pub fn hitbox(&self, id: HitboxId) -> Option<&Hitbox> {
        self.hitboxes.get(&id)
    }

    pub fn hitboxes(&self) -> impl Iterator<Item = &Hitbox> {
        self.hitboxes.values()
    }

    pub fn len(&self) -> usize {
        self.hitboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hitboxes.is_empty()
    }

    /// One slab per label, for the unit slab mesh.
    pub fn label_instances(&self) -> Vec<InstanceRaw> {
        self.hitboxes
            .values()
            .map(|hitbox| {
                Instance {
                    position: hitbox.origin,
                    scale: Vector3::new(hitbox.size.x, hitbox.size.y, self.label_depth),
                    ..Default::default()
                }
                .to_raw(self.label_colour)
            })
            .collect()
    }
}
