use crate::foundation::core::Rgb8;
use crate::foundation::math::div_round;

/// A contiguous run of histogram entries sharing one palette slot.
#[derive(Clone, Copy, Debug)]
struct ColorBox {
    start: usize,
    end: usize,
    pixels: u64,
}

impl ColorBox {
    fn widest_channel(&self, entries: &[(Rgb8, u64)]) -> (usize, u8) {
        let mut lo = [u8::MAX; 3];
        let mut hi = [0u8; 3];
        for (color, _) in &entries[self.start..self.end] {
            for c in 0..3 {
                lo[c] = lo[c].min(color.channel(c));
                hi[c] = hi[c].max(color.channel(c));
            }
        }
        let mut best = (0, 0);
        for c in 0..3 {
            let range = hi[c] - lo[c];
            if range > best.1 {
                best = (c, range);
            }
        }
        best
    }

    fn mean(&self, entries: &[(Rgb8, u64)]) -> Rgb8 {
        let mut sum = [0u64; 3];
        for (color, n) in &entries[self.start..self.end] {
            for (c, s) in sum.iter_mut().enumerate() {
                *s += u64::from(color.channel(c)) * n;
            }
        }
        let avg = |s: u64| div_round(s, self.pixels).min(255) as u8;
        Rgb8::new(avg(sum[0]), avg(sum[1]), avg(sum[2]))
    }
}

/// Reduce a histogram of distinct colors to at most `budget` representatives.
///
/// `entries` is reordered in place. The result is deduplicated and sorted by packed RGB.
pub(crate) fn median_cut(entries: &mut [(Rgb8, u64)], budget: usize) -> Vec<Rgb8> {
    if entries.is_empty() || budget == 0 {
        return Vec::new();
    }

    let mut boxes = vec![ColorBox {
        start: 0,
        end: entries.len(),
        pixels: entries.iter().map(|(_, n)| n).sum(),
    }];

    while boxes.len() < budget {
        // Widest range first, then more pixels, then the earlier box.
        let mut pick: Option<(usize, usize, u8)> = None;
        for (i, b) in boxes.iter().enumerate() {
            if b.end - b.start < 2 {
                continue;
            }
            let (channel, range) = b.widest_channel(entries);
            if range == 0 {
                continue;
            }
            let better = match pick {
                None => true,
                Some((j, _, best)) => {
                    range > best || (range == best && b.pixels > boxes[j].pixels)
                }
            };
            if better {
                pick = Some((i, channel, range));
            }
        }
        let Some((i, channel, _)) = pick else {
            break;
        };

        let b = boxes[i];
        let slice = &mut entries[b.start..b.end];
        slice.sort_unstable_by_key(|(color, _)| (color.channel(channel), color.pack()));

        let half = b.pixels.div_ceil(2);
        let mut acc = 0u64;
        let mut cut = 1;
        for (k, (_, n)) in slice.iter().enumerate() {
            acc += n;
            if acc >= half {
                cut = k + 1;
                break;
            }
        }
        let cut = cut.clamp(1, slice.len() - 1);
        let left_pixels: u64 = slice[..cut].iter().map(|(_, n)| n).sum();

        boxes[i] = ColorBox {
            start: b.start,
            end: b.start + cut,
            pixels: left_pixels,
        };
        boxes.push(ColorBox {
            start: b.start + cut,
            end: b.end,
            pixels: b.pixels - left_pixels,
        });
    }

    let mut palette: Vec<Rgb8> = boxes.iter().map(|b| b.mean(entries)).collect();
    palette.sort_unstable();
    palette.dedup();
    palette
}

#[cfg(test)]
#[path = "../../tests/unit/quantize/median_cut.rs"]
mod tests;
