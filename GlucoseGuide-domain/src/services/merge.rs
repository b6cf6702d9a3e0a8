use std::cmp::Ordering;

use uuid::Uuid;

use crate::entities::{Bgl, CombinedReading, Hba1c, Measurement};

fn fresh_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn fused(bgl: &Measurement<Bgl>, hba1c: &Measurement<Hba1c>) -> CombinedReading {
    CombinedReading {
        id: fresh_id(),
        record_time: bgl.record_time,
        event_timing: bgl.event_timing,
        sunao_food: bgl.sunao_food,
        bgl_id: Some(bgl.id.clone()),
        bgl_value: Some(bgl.value),
        hba1c_id: Some(hba1c.id.clone()),
        hba1c_value: Some(hba1c.value),
    }
}

fn bgl_only(bgl: &Measurement<Bgl>) -> CombinedReading {
    CombinedReading {
        id: fresh_id(),
        record_time: bgl.record_time,
        event_timing: bgl.event_timing,
        sunao_food: bgl.sunao_food,
        bgl_id: Some(bgl.id.clone()),
        bgl_value: Some(bgl.value),
        hba1c_id: None,
        hba1c_value: None,
    }
}

fn hba1c_only(hba1c: &Measurement<Hba1c>) -> CombinedReading {
    CombinedReading {
        id: fresh_id(),
        record_time: hba1c.record_time,
        event_timing: hba1c.event_timing,
        sunao_food: hba1c.sunao_food,
        bgl_id: None,
        bgl_value: None,
        hba1c_id: Some(hba1c.id.clone()),
        hba1c_value: Some(hba1c.value),
    }
}

/// Merge BGL and HbA1c readings into one chronological feed.
///
/// Readings from both sides taken at the same instant fuse into a single
/// entry whose shared fields come from the BGL reading. Every input record
/// appears in exactly one output entry.
pub fn merge_feeds(bgl: &[Measurement<Bgl>], hba1c: &[Measurement<Hba1c>]) -> Vec<CombinedReading> {
    let mut bgl: Vec<&Measurement<Bgl>> = bgl.iter().collect();
    let mut hba1c: Vec<&Measurement<Hba1c>> = hba1c.iter().collect();
    bgl.sort_by_key(|m| m.record_time);
    hba1c.sort_by_key(|m| m.record_time);

    let mut merged = Vec::with_capacity(bgl.len() + hba1c.len());
    let (mut i, mut j) = (0, 0);

    loop {
        let entry = match (bgl.get(i), hba1c.get(j)) {
            (Some(b), Some(h)) => match b.record_time.cmp(&h.record_time) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                    fused(b, h)
                }
                Ordering::Less => {
                    i += 1;
                    bgl_only(b)
                }
                Ordering::Greater => {
                    j += 1;
                    hba1c_only(h)
                }
            },
            (Some(b), None) => {
                i += 1;
                bgl_only(b)
            }
            (None, Some(h)) => {
                j += 1;
                hba1c_only(h)
            }
            (None, None) => break,
        };
        merged.push(entry);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::marker::PhantomData;

    use chrono::{NaiveDate, NaiveDateTime, Utc};

    use crate::entities::{DataSet, EventTiming, SunaoFood};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 18).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn reading<K: DataSet>(id: &str, hour: u32, value: f64, timing: EventTiming) -> Measurement<K> {
        Measurement {
            id: id.to_string(),
            user_id: "u1".to_string(),
            value,
            event_timing: timing,
            record_time: at(hour),
            sunao_food: None,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            kind: PhantomData,
        }
    }

    #[test]
    fn test_equal_times_fuse() {
        let mut b = reading::<Bgl>("b1", 8, 120.0, EventTiming::AfterMeal);
        b.sunao_food = Some(SunaoFood::IceCream);
        let h = reading::<Hba1c>("h1", 8, 6.1, EventTiming::BeforeMeal);

        let merged = merge_feeds(&[b], &[h]);

        assert_eq!(merged.len(), 1);
        let entry = &merged[0];
        assert_eq!(entry.record_time, at(8));
        assert_eq!(entry.bgl_id.as_deref(), Some("b1"));
        assert_eq!(entry.bgl_value, Some(120.0));
        assert_eq!(entry.hba1c_id.as_deref(), Some("h1"));
        assert_eq!(entry.hba1c_value, Some(6.1));
        assert_eq!(entry.event_timing, EventTiming::AfterMeal);
        assert_eq!(entry.sunao_food, Some(SunaoFood::IceCream));
        assert_ne!(entry.id, "b1");
        assert_ne!(entry.id, "h1");
    }

    #[test]
    fn test_interleaves_by_time() {
        let bgl = vec![
            reading::<Bgl>("b9", 9, 130.0, EventTiming::AfterMeal),
            reading::<Bgl>("b7", 7, 95.0, EventTiming::WakeUp),
        ];
        let hba1c = vec![reading::<Hba1c>("h8", 8, 5.9, EventTiming::Other)];

        let merged = merge_feeds(&bgl, &hba1c);

        let times: Vec<_> = merged.iter().map(|e| e.record_time).collect();
        assert_eq!(times, vec![at(7), at(8), at(9)]);

        assert_eq!(merged[0].bgl_id.as_deref(), Some("b7"));
        assert_eq!(merged[0].hba1c_id, None);
        assert_eq!(merged[0].hba1c_value, None);
        assert_eq!(merged[0].event_timing, EventTiming::WakeUp);

        assert_eq!(merged[1].bgl_id, None);
        assert_eq!(merged[1].bgl_value, None);
        assert_eq!(merged[1].hba1c_id.as_deref(), Some("h8"));
        assert_eq!(merged[1].hba1c_value, Some(5.9));
        assert_eq!(merged[1].event_timing, EventTiming::Other);

        assert_eq!(merged[2].bgl_id.as_deref(), Some("b9"));
    }

    #[test]
    fn test_hba1c_around_single_bgl() {
        let bgl = vec![reading::<Bgl>("b9", 9, 90.0, EventTiming::AfterMeal)];
        let hba1c = vec![
            reading::<Hba1c>("h8", 8, 5.6, EventTiming::Other),
            reading::<Hba1c>("h10", 10, 5.8, EventTiming::Other),
        ];

        let merged = merge_feeds(&bgl, &hba1c);

        let order: Vec<_> = merged
            .iter()
            .map(|e| (e.record_time, e.bgl_value, e.hba1c_value))
            .collect();
        assert_eq!(
            order,
            vec![
                (at(8), None, Some(5.6)),
                (at(9), Some(90.0), None),
                (at(10), None, Some(5.8)),
            ]
        );
    }

    #[test]
    fn test_one_side_empty() {
        let hba1c = vec![
            reading::<Hba1c>("h1", 6, 5.5, EventTiming::Other),
            reading::<Hba1c>("h2", 10, 5.6, EventTiming::Other),
        ];
        let merged = merge_feeds(&[], &hba1c);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|e| e.bgl_id.is_none() && e.hba1c_id.is_some()));

        assert!(merge_feeds(&[], &[]).is_empty());
    }

    #[test]
    fn test_every_record_appears_once() {
        let bgl: Vec<_> = [3, 5, 5, 8, 12]
            .iter()
            .enumerate()
            .map(|(n, h)| reading::<Bgl>(&format!("b{}", n), *h, 100.0, EventTiming::Other))
            .collect();
        let hba1c: Vec<_> = [1, 5, 8, 20]
            .iter()
            .enumerate()
            .map(|(n, h)| reading::<Hba1c>(&format!("h{}", n), *h, 6.0, EventTiming::Other))
            .collect();

        let merged = merge_feeds(&bgl, &hba1c);
        let fused = merged.iter().filter(|e| e.bgl_id.is_some() && e.hba1c_id.is_some()).count();

        assert_eq!(fused, 2);
        assert_eq!(merged.len(), bgl.len() + hba1c.len() - fused);
        assert!(merged.windows(2).all(|w| w[0].record_time <= w[1].record_time));

        let bgl_ids: HashSet<_> = merged.iter().filter_map(|e| e.bgl_id.clone()).collect();
        let hba1c_ids: HashSet<_> = merged.iter().filter_map(|e| e.hba1c_id.clone()).collect();
        assert_eq!(bgl_ids.len(), bgl.len());
        assert_eq!(hba1c_ids.len(), hba1c.len());

        let ids: HashSet<_> = merged.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), merged.len());
    }

    #[test]
    fn test_equal_time_bgl_keeps_input_order() {
        let bgl = vec![
            reading::<Bgl>("first", 5, 100.0, EventTiming::Other),
            reading::<Bgl>("second", 5, 101.0, EventTiming::Other),
        ];
        let hba1c = vec![reading::<Hba1c>("h", 5, 6.0, EventTiming::Other)];

        let merged = merge_feeds(&bgl, &hba1c);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].bgl_id.as_deref(), Some("first"));
        assert_eq!(merged[0].hba1c_id.as_deref(), Some("h"));
        assert_eq!(merged[1].bgl_id.as_deref(), Some("second"));
        assert_eq!(merged[1].hba1c_id, None);
    }
}
