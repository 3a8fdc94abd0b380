//! Fixed display tables and user-facing texts.
//!
//! Everything rendered to the poll text or shown as a notification lives
//! here so the rest of the crate never embeds locale strings.

/// Ordinal markers assigned to candidates by position.
pub const GLYPHS: [&str; 10] = [
    "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
];

/// Upper bound on the candidate list; one glyph per entry.
pub const MAX_CANDIDATES: usize = GLYPHS.len();

/// Weekday labels indexed from Sunday.
pub const WEEKDAY_LABELS: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

pub const NONE_OPTION_GLYPH: &str = "❌";
pub const NONE_OPTION_LABEL: &str = "どの日程も不可";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub label: &'static str,
    pub time: &'static str,
}

/// Quick-pick table of named class periods.
pub const PERIODS: [Period; 7] = [
    Period {
        label: "1限目",
        time: "09:10",
    },
    Period {
        label: "2限目",
        time: "10:50",
    },
    Period {
        label: "昼休憩",
        time: "12:20",
    },
    Period {
        label: "3限目",
        time: "13:10",
    },
    Period {
        label: "4限目",
        time: "14:50",
    },
    Period {
        label: "5限目",
        time: "16:30",
    },
    Period {
        label: "6限目",
        time: "18:00",
    },
];

pub fn glyph_for(position: usize) -> &'static str {
    GLYPHS.get(position).copied().unwrap_or("")
}

/// Position of a period in the quick-pick table by its label.
pub fn period_index(label: &str) -> Option<usize> {
    PERIODS.iter().position(|period| period.label == label)
}

pub mod messages {
    pub const INCOMPLETE_SELECTION: &str = "日付と時間を選択してください";
    pub const INVALID_TIME: &str = "有効な時刻形式で入力してください";
    pub const DUPLICATE: &str = "選択した日付と時間の組み合わせは既に追加されています";
    pub const PAST_DATE: &str = "過去の日付は選択できません";
    pub const OUTSIDE_WINDOW: &str = "カレンダーの範囲外の日付です";
    pub const NOTHING_TO_COPY: &str = "コピーする内容がありません";
    pub const COPIED: &str = "クリップボードにコピーしました!";
    pub const COPY_FAILED: &str = "コピーに失敗しました";
    pub const TIME_FORMAT_ERROR: &str = "無効な時刻形式です";
    pub const TIME_FORMAT_HINT: &str =
        "有効な形式: 4桁の数字（例: 1430）、3桁の数字（例: 930）、または HH:MM 形式（例: 14:30）";
    pub const EMPTY_LIST: &str = "候補日が追加されていません";
    pub const EMPTY_PREVIEW: &str = "イベント概要または候補日を追加するとここにプレビューが表示されます";
}
