//! Kinematic body for a combatant: position, velocity and stage contact.
//!
//! The anchor is the bottom-center of the body (the feet). The y axis points
//! down, so the floor is the largest y a body may reach.

use crate::config::StageConfig;
use crate::math::{Aabb, Fixed, Vec2Fixed};

/// Stage bounds in simulation units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageBounds {
    /// Floor y.
    pub floor_y: Fixed,
    /// Left wall x.
    pub left_wall: Fixed,
    /// Right wall x.
    pub right_wall: Fixed,
}

impl StageBounds {
    /// Convert stage configuration into fixed-point bounds.
    #[must_use]
    pub fn from_config(stage: &StageConfig) -> Self {
        Self {
            floor_y: Fixed::from_num(stage.floor_y),
            left_wall: Fixed::from_num(stage.left_wall),
            right_wall: Fixed::from_num(stage.right_wall),
        }
    }

    /// Clamp an anchor x so a body of the given half width stays between the walls.
    #[must_use]
    pub fn clamp_x(&self, x: Fixed, half_width: Fixed) -> Fixed {
        let min = self.left_wall + half_width;
        let max = self.right_wall - half_width;
        if min > max {
            return (self.left_wall + self.right_wall) / Fixed::from_num(2);
        }
        x.clamp(min, max)
    }
}

/// Position, velocity and body size of one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Body {
    /// Feet anchor.
    pub position: Vec2Fixed,
    /// Velocity in units per second.
    pub velocity: Vec2Fixed,
    width: Fixed,
    height: Fixed,
    grounded: bool,
}

impl Body {
    /// Create a body standing on the floor at `x`.
    #[must_use]
    pub fn standing(x: Fixed, bounds: &StageBounds, width: Fixed, height: Fixed) -> Self {
        let half_width = width / Fixed::from_num(2);
        Self {
            position: Vec2Fixed::new(bounds.clamp_x(x, half_width), bounds.floor_y),
            velocity: Vec2Fixed::ZERO,
            width,
            height,
            grounded: true,
        }
    }

    /// Whether the feet rested on the floor after the last step.
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Half of the body width.
    #[must_use]
    pub fn half_width(&self) -> Fixed {
        self.width / Fixed::from_num(2)
    }

    /// Hurtbox rectangle, standing on the anchor.
    #[must_use]
    pub fn hurtbox(&self) -> Aabb {
        let center = Vec2Fixed::new(
            self.position.x,
            self.position.y - self.height / Fixed::from_num(2),
        );
        Aabb::from_center(center, self.width, self.height)
    }

    /// Mark the body as having left the ground this tick (a jump was issued).
    pub fn leave_ground(&mut self) {
        self.grounded = false;
    }

    /// Semi-implicit Euler step: gravity into velocity, velocity into position,
    /// then floor and wall contact.
    pub fn integrate(&mut self, dt_secs: Fixed, gravity: Fixed, bounds: &StageBounds) {
        self.velocity.y += gravity * dt_secs;
        self.position = self.position + self.velocity.scale(dt_secs);

        if self.position.y >= bounds.floor_y {
            self.position.y = bounds.floor_y;
            if self.velocity.y > Fixed::ZERO {
                self.velocity.y = Fixed::ZERO;
            }
            self.grounded = self.velocity.y >= Fixed::ZERO;
        } else {
            self.grounded = false;
        }

        self.clamp_to_walls(bounds);
    }

    /// Shift horizontally, staying inside the walls.
    pub fn shift_x(&mut self, dx: Fixed, bounds: &StageBounds) {
        self.position.x += dx;
        self.clamp_to_walls(bounds);
    }

    fn clamp_to_walls(&mut self, bounds: &StageBounds) {
        let clamped = bounds.clamp_x(self.position.x, self.half_width());
        if clamped != self.position.x {
            self.position.x = clamped;
            self.velocity.x = Fixed::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> StageBounds {
        StageBounds::from_config(&StageConfig::default())
    }

    fn body_at(x: i32) -> Body {
        Body::standing(
            Fixed::from_num(x),
            &bounds(),
            Fixed::from_num(80),
            Fixed::from_num(180),
        )
    }

    #[test]
    fn test_standing_body_rests_on_floor() {
        let body = body_at(300);
        assert!(body.is_grounded());
        assert_eq!(body.position, Vec2Fixed::from_ints(300, 620));
        let hurtbox = body.hurtbox();
        assert_eq!(hurtbox.min_x(), Fixed::from_num(260));
        assert_eq!(hurtbox.max_y(), Fixed::from_num(620));
        assert_eq!(hurtbox.min_y(), Fixed::from_num(440));
    }

    #[test]
    fn test_jump_leaves_floor_and_lands() {
        let bounds = bounds();
        let mut body = body_at(300);
        body.velocity.y = Fixed::from_num(-550);
        body.leave_ground();

        let dt = Fixed::from_num(0.016);
        body.integrate(dt, Fixed::from_num(1000), &bounds);
        assert!(!body.is_grounded());
        assert!(body.position.y < bounds.floor_y);

        for _ in 0..200 {
            body.integrate(dt, Fixed::from_num(1400), &bounds);
        }
        assert!(body.is_grounded());
        assert_eq!(body.position.y, bounds.floor_y);
        assert_eq!(body.velocity.y, Fixed::ZERO);
    }

    #[test]
    fn test_walls_stop_horizontal_motion() {
        let bounds = bounds();
        let mut body = body_at(60);
        body.velocity.x = Fixed::from_num(-200);
        body.integrate(Fixed::from_num(0.5), Fixed::from_num(1000), &bounds);

        assert_eq!(body.position.x, Fixed::from_num(40));
        assert_eq!(body.velocity.x, Fixed::ZERO);

        body.shift_x(Fixed::from_num(5000), &bounds);
        assert_eq!(body.position.x, Fixed::from_num(1240));
    }
}
