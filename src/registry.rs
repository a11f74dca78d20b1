use crate::entities::{Entity, Obstacle, Player};
use crate::rendering::Canvas;
use crate::terminal_io::InputState;

/// Live entities in insertion order. Later entries draw on top.
#[derive(Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        EntityRegistry { entities: Vec::new() }
    }

    pub fn add(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Runs every member's update, then drops the ones that died.
    pub fn update(&mut self, input: &InputState) {
        for entity in &mut self.entities {
            entity.update(input);
        }
        self.entities.retain(Entity::is_alive);
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        for entity in &self.entities {
            entity.draw(canvas);
        }
    }

    pub fn player(&self) -> Option<&Player> {
        self.entities.iter().find_map(|entity| match entity {
            Entity::Player(p) => Some(p),
            Entity::Obstacle(_) => None,
        })
    }

    pub fn player_count(&self) -> usize {
        self.entities.iter().filter(|e| matches!(e, Entity::Player(_))).count()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.entities.iter().filter_map(|entity| match entity {
            Entity::Obstacle(o) => Some(o),
            Entity::Player(_) => None,
        })
    }

    pub fn boost_obstacles(&mut self, delta: i32) {
        for entity in &mut self.entities {
            if let Entity::Obstacle(o) = entity {
                o.fall_speed += delta;
            }
        }
    }

    /// True when the player overlaps any obstacle.
    pub fn player_collides(&self) -> bool {
        let Some(player) = self.player() else {
            return false;
        };
        self.obstacles().any(|o| player.rect.intersects(&o.rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::sprite::{Shape, Sprite};
    use crate::types::{Rect, Rgb};

    fn block(x: i32, y: i32, size: i32, speed: i32, color: Rgb) -> Entity {
        Entity::Obstacle(Obstacle::new(Rect::new(x, y, size, size), speed, Sprite::Procedural(Shape::Solid(color))))
    }

    #[test]
    fn update_moves_everyone_and_removes_fallen_obstacles() {
        let mut registry = EntityRegistry::new();
        registry.add(Entity::Player(Player::spawn(None)));
        registry.add(block(0, SCREEN_HEIGHT - 2, 20, 5, RED));
        registry.add(block(100, 0, 20, 5, RED));

        registry.update(&InputState { left: false, right: true });

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.player().map(|p| p.rect.x), Some(221));
        let ys: Vec<i32> = registry.obstacles().map(|o| o.rect.y).collect();
        assert_eq!(ys, vec![5]);
    }

    #[test]
    fn removed_obstacle_is_never_drawn_again() {
        let mut registry = EntityRegistry::new();
        registry.add(block(0, SCREEN_HEIGHT, 20, 1, RED));
        registry.update(&InputState::default());
        assert_eq!(registry.len(), 0);

        let mut canvas = Canvas::new(SCREEN_WIDTH, SCREEN_HEIGHT, BLACK);
        registry.draw(&mut canvas);
        assert_eq!(canvas.get(0, SCREEN_HEIGHT - 1), Some(BLACK));
    }

    #[test]
    fn later_entities_draw_on_top() {
        let mut registry = EntityRegistry::new();
        registry.add(block(0, 0, 20, 0, RED));
        registry.add(block(10, 10, 20, 0, GREEN));
        let mut canvas = Canvas::new(40, 40, BLACK);
        registry.draw(&mut canvas);
        assert_eq!(canvas.get(5, 5), Some(RED));
        assert_eq!(canvas.get(15, 15), Some(GREEN));
        assert_eq!(canvas.get(25, 25), Some(GREEN));
    }

    #[test]
    fn boost_only_touches_obstacles() {
        let mut registry = EntityRegistry::new();
        registry.add(Entity::Player(Player::spawn(None)));
        registry.add(block(0, 0, 20, 3, RED));
        registry.add(block(50, 0, 20, 8, RED));
        registry.boost_obstacles(1);
        let speeds: Vec<i32> = registry.obstacles().map(|o| o.fall_speed).collect();
        assert_eq!(speeds, vec![4, 9]);
        assert_eq!(registry.player().map(|p| p.speed), Some(PLAYER_SPEED));
    }

    #[test]
    fn collision_uses_bounding_rects() {
        let mut registry = EntityRegistry::new();
        registry.add(Entity::Player(Player::spawn(None)));
        assert!(!registry.player_collides());

        // Touching the ship's top edge only.
        registry.add(block(215, 555, 20, 0, RED));
        assert!(!registry.player_collides());

        registry.add(block(250, 560, 20, 0, RED));
        assert!(registry.player_collides());
    }

    #[test]
    fn no_player_means_no_collision() {
        let mut registry = EntityRegistry::new();
        registry.add(block(0, 0, 20, 0, RED));
        assert!(!registry.player_collides());
        assert_eq!(registry.player_count(), 0);
    }
}
