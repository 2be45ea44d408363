pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// 64x32 monochrome bitmap, one `u64` per row.
///
/// Pixel `x` of a row is bit `x` of that row's word, so x = 0 is the least
/// significant bit. Drawing, `get_pixel` and every frontend use this ordering.
pub struct Display {
    rows: [u64; DISPLAY_HEIGHT],
    dirty: bool, // set whenever a pixel changes, cleared by whoever renders the frame
}

impl Display {
    pub fn new() -> Self {
        Self {
            rows: [0; DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    pub fn clear(&mut self) {
        if self.rows.iter().any(|&row| row != 0) {
            self.dirty = true;
        }
        self.rows = [0; DISPLAY_HEIGHT];
    }

    /// Out of range coordinates read as off.
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return false;
        }
        self.rows[y] & (1 << x) != 0
    }

    /// XOR one 8-pixel sprite row onto the screen with its leftmost pixel at
    /// (x, y). The most significant sprite bit is the leftmost pixel; each
    /// pixel column wraps around the right edge on its own.
    ///
    /// Returns true if any lit pixel was turned off.
    pub fn draw_sprite_row(&mut self, x: usize, y: usize, sprite: u8) -> bool {
        let y = y % DISPLAY_HEIGHT;
        let mut pattern = 0u64;
        for p in 0..8 {
            if sprite & (0x80 >> p) != 0 {
                pattern |= 1 << ((x + p) % DISPLAY_WIDTH);
            }
        }
        if pattern == 0 {
            return false;
        }

        let collision = self.rows[y] & pattern != 0;
        self.rows[y] ^= pattern;
        self.dirty = true;
        collision
    }

    pub fn rows(&self) -> &[u64; DISPLAY_HEIGHT] {
        &self.rows
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_blank_and_clean() {
        let d = Display::new();
        assert!(d.rows().iter().all(|&r| r == 0));
        assert!(!d.is_dirty());
    }

    #[test]
    fn x_zero_is_lsb() {
        let mut d = Display::new();
        d.draw_sprite_row(0, 0, 0x80);
        assert_eq!(d.rows()[0], 0x1);
        assert!(d.get_pixel(0, 0));
        assert!(!d.get_pixel(1, 0));
    }

    #[test]
    fn full_row_sets_low_byte() {
        let mut d = Display::new();
        assert!(!d.draw_sprite_row(0, 0, 0xFF));
        assert_eq!(d.rows()[0], 0xFF);
        assert!(d.is_dirty());
    }

    #[test]
    fn redraw_erases_and_collides() {
        let mut d = Display::new();
        d.draw_sprite_row(10, 5, 0b1010_0000);
        assert!(d.draw_sprite_row(10, 5, 0b1010_0000));
        assert_eq!(d.rows()[5], 0);
    }

    #[test]
    fn partial_overlap_only_collides_on_lit_pixels() {
        let mut d = Display::new();
        d.draw_sprite_row(0, 0, 0b1000_0000);
        assert!(!d.draw_sprite_row(0, 0, 0b0100_0000));
        assert_eq!(d.rows()[0], 0b11);
    }

    #[test]
    fn pixels_wrap_past_right_edge() {
        let mut d = Display::new();
        d.draw_sprite_row(60, 0, 0xFF);
        for x in 60..64 {
            assert!(d.get_pixel(x, 0));
        }
        for x in 0..4 {
            assert!(d.get_pixel(x, 0));
        }
        assert!(!d.get_pixel(4, 0));
    }

    #[test]
    fn rows_wrap_past_bottom() {
        let mut d = Display::new();
        d.draw_sprite_row(0, 33, 0x80);
        assert!(d.get_pixel(0, 1));
    }

    #[test]
    fn blank_sprite_is_not_a_write() {
        let mut d = Display::new();
        assert!(!d.draw_sprite_row(3, 3, 0));
        assert!(!d.is_dirty());
    }

    #[test]
    fn out_of_range_reads_are_off() {
        let mut d = Display::new();
        d.draw_sprite_row(0, 0, 0xFF);
        assert!(!d.get_pixel(64, 0));
        assert!(!d.get_pixel(0, 32));
        assert!(!d.get_pixel(usize::MAX, usize::MAX));
    }

    #[test]
    fn clear_marks_dirty_only_when_something_was_lit() {
        let mut d = Display::new();
        d.clear();
        assert!(!d.is_dirty());

        d.draw_sprite_row(0, 0, 0x01);
        d.clear_dirty();
        d.clear();
        assert!(d.is_dirty());
        assert!(d.rows().iter().all(|&r| r == 0));
    }
}
