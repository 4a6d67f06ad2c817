mod story_titles;
mod story_chapters;

pub use story_titles::{StoryTitle, StoryTitlesAgent, StoryTitlesRequest, StoryTitlesTool};
pub use story_chapters::{StoryChaptersAgent, StoryChaptersRequest, StoryChaptersTool};
