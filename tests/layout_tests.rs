use jatos_tools::JatosError;
use jatos_tools::core::{LayoutMetrics, compute_word_boxes};
use jatos_tools::font::{FixedAdvanceMeasurer, TextMeasurer};

fn ten_px() -> FixedAdvanceMeasurer {
    FixedAdvanceMeasurer::new(10.0)
}

/// Every adjacent character pair kerns by -1 px, so widths are not additive.
struct KerningMeasurer;

impl TextMeasurer for KerningMeasurer {
    fn text_width(&self, text: &str) -> f64 {
        let chars = text.chars().count() as f64;
        if chars == 0.0 {
            0.0
        } else {
            10.0 * chars - (chars - 1.0)
        }
    }
}

#[test]
fn short_sentence_stays_on_first_line() {
    let boxes = compute_word_boxes("the cat sat", 200, &ten_px(), LayoutMetrics::default())
        .expect("layout");

    let spans: Vec<(&str, f64, f64, usize)> = boxes
        .iter()
        .map(|b| (b.word.as_str(), b.x_start, b.x_end, b.line_index))
        .collect();
    assert_eq!(
        spans,
        vec![
            ("the", 15.0, 45.0, 0),
            ("cat", 55.0, 85.0, 0),
            ("sat", 95.0, 125.0, 0),
        ]
    );
    assert!(boxes.iter().all(|b| b.y_position == 30.0));
    assert_eq!(
        boxes.iter().map(|b| b.word_index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn words_wrap_when_line_exceeds_available_width() {
    // 100 px canvas minus 30 px padding leaves 70 px per line.
    let boxes = compute_word_boxes("aaaa bbbb cccc", 100, &ten_px(), LayoutMetrics::default())
        .expect("layout");

    assert_eq!(boxes.len(), 3);
    for (word_box, line) in boxes.iter().zip(0..) {
        assert_eq!(word_box.line_index, line);
        assert_eq!(word_box.x_start, 15.0);
        assert_eq!(word_box.x_end, 55.0);
    }
    assert_eq!(boxes[1].y_position, 55.0);
    assert_eq!(boxes[2].y_position, 80.0);
}

#[test]
fn line_exactly_filling_available_width_does_not_wrap() {
    // "aaa bbb" is 70 px, exactly the available width.
    let boxes =
        compute_word_boxes("aaa bbb", 100, &ten_px(), LayoutMetrics::default()).expect("layout");
    assert_eq!(boxes[1].line_index, 0);
    assert_eq!(boxes[1].x_start, 55.0);
}

#[test]
fn over_wide_word_is_never_split() {
    let boxes =
        compute_word_boxes("abcdefgh x", 50, &ten_px(), LayoutMetrics::default()).expect("layout");

    assert_eq!(boxes[0].line_index, 0);
    assert_eq!((boxes[0].x_start, boxes[0].x_end), (15.0, 95.0));
    assert_eq!(boxes[1].line_index, 1);
    assert_eq!((boxes[1].x_start, boxes[1].x_end), (15.0, 25.0));
}

#[test]
fn consecutive_spaces_produce_zero_width_words() {
    let boxes =
        compute_word_boxes("a  b", 200, &ten_px(), LayoutMetrics::default()).expect("layout");

    let words: Vec<&str> = boxes.iter().map(|b| b.word.as_str()).collect();
    assert_eq!(words, vec!["a", "", "b"]);
    assert_eq!((boxes[1].x_start, boxes[1].x_end), (35.0, 35.0));
    assert_eq!((boxes[2].x_start, boxes[2].x_end), (45.0, 55.0));
}

#[test]
fn leading_and_trailing_spaces_keep_degenerate_boxes() {
    let boxes =
        compute_word_boxes(" a ", 200, &ten_px(), LayoutMetrics::default()).expect("layout");

    assert_eq!(boxes.len(), 3);
    assert_eq!((boxes[0].x_start, boxes[0].x_end), (15.0, 15.0));
    assert_eq!((boxes[1].x_start, boxes[1].x_end), (15.0, 25.0));
    assert_eq!(boxes[2].word, "");
}

#[test]
fn empty_text_yields_single_empty_box() {
    let boxes = compute_word_boxes("", 200, &ten_px(), LayoutMetrics::default()).expect("layout");
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].width(), 0.0);
}

#[test]
fn cursor_is_derived_from_line_prefix_width() {
    let boxes =
        compute_word_boxes("ab cd", 200, &KerningMeasurer, LayoutMetrics::default())
            .expect("layout");

    assert_eq!((boxes[0].x_start, boxes[0].x_end), (15.0, 34.0));
    // width("ab ") = 28, not width("ab") + width(" ") = 29.
    assert_eq!((boxes[1].x_start, boxes[1].x_end), (43.0, 62.0));
}

#[test]
fn custom_metrics_shift_origin_and_line_spacing() {
    let metrics = LayoutMetrics {
        horizontal_padding: 40,
        vertical_padding_top: 0,
        line_height: 40,
    };
    let boxes = compute_word_boxes("aaaa bbbb", 100, &ten_px(), metrics).expect("layout");

    assert_eq!(boxes[0].x_start, 20.0);
    assert_eq!(boxes[0].y_position, 10.0);
    assert_eq!(boxes[1].line_index, 1);
    assert_eq!(boxes[1].y_position, 50.0);
}

#[test]
fn zero_canvas_width_is_rejected() {
    let err = compute_word_boxes("the cat", 0, &ten_px(), LayoutMetrics::default())
        .expect_err("zero width must fail");
    assert!(matches!(err, JatosError::InvalidArgument(_)));
}
