//! In-app routes: `/`, `/manga/:id`, `/manga/:mangaId/chapter/:chapterId`

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Manga {
        id: String,
    },
    Reader {
        manga_id: String,
        chapter_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route '{0}'")]
pub struct RouteError(pub String);

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s
            .trim()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Ok(Route::Home),
            ["manga", id] => Ok(Route::Manga { id: id.to_string() }),
            ["manga", manga_id, "chapter", chapter_id] => Ok(Route::Reader {
                manga_id: manga_id.to_string(),
                chapter_id: chapter_id.to_string(),
            }),
            _ => Err(RouteError(s.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Manga { id } => write!(f, "/manga/{}", id),
            Route::Reader { manga_id, chapter_id } => {
                write!(f, "/manga/{}/chapter/{}", manga_id, chapter_id)
            }
        }
    }
}
