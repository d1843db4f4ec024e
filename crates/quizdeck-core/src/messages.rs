//! User-facing messages.

pub const LOAD_QUESTIONS_FAILED: &str = "문제를 불러오는데 실패했습니다.";
/// Shown whenever no questions can be offered for the current selection.
pub const NOT_YET_AVAILABLE: &str = "해당 시험 문제는 아직 준비되지 않았습니다.";
pub const NO_SETS_AVAILABLE: &str = "사용 가능한 문제 세트가 없습니다.";

pub const CORRECT: &str = "정답입니다!";
pub const INCORRECT: &str = "오답입니다.";

pub const SUBMIT_FAILED: &str = "문제 세트를 등록하지 못했습니다. 다시 시도해 주세요.";
pub const TITLE_REQUIRED: &str = "제목을 입력해 주세요.";

/// "총 점수: N점 (정답 c개 / 총 t문항)"
pub fn score_line(percent: u32, correct: usize, total: usize) -> String {
    format!("총 점수: {percent}점 (정답 {correct}개 / 총 {total}문항)")
}
