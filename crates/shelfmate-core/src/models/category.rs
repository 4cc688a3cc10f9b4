use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed catalogue of book categories a book can be filed under.
///
/// Tags are camelCase on the wire and in storage (`historicalFiction`,
/// `selfHelp`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum BookCategory {
    // Fiction
    Adventure,
    Classics,
    Contemporary,
    Fantasy,
    HistoricalFiction,
    Horror,
    MysteryCrime,
    Romance,
    ScienceFiction,
    ThrillerSuspense,
    YoungAdult,

    // Non-fiction
    ArtPhotography,
    BiographyMemoir,
    BusinessEconomics,
    CookingFood,
    HealthWellness,
    History,
    PoliticsSocialSciences,
    ReligionSpirituality,
    ScienceNature,
    SelfHelp,
    TravelAdventure,

    // Academic & educational
    ComputersTechnology,
    Engineering,
    Mathematics,
    MedicalHealthSciences,
    Psychology,
    Reference,
    StudyAids,
    TestPreparation,
    Textbooks,

    // Children's books
    ActivityBooks,
    EarlyLearning,
    PictureBooks,
    ChapterBooks,
    MiddleGrade,

    // Comics & graphic novels
    Manga,
    Superheroes,
    Webcomics,
    FantasySciFi,

    // Special audiences
    Lgbtq,
    Multicultural,
    WomensFiction,

    // Other
    Poetry,
    Drama,
    Essays,
    Anthologies,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown book category: {0}")]
pub struct UnknownCategory(pub String);

impl BookCategory {
    pub const ALL: [BookCategory; 47] = [
        Self::Adventure,
        Self::Classics,
        Self::Contemporary,
        Self::Fantasy,
        Self::HistoricalFiction,
        Self::Horror,
        Self::MysteryCrime,
        Self::Romance,
        Self::ScienceFiction,
        Self::ThrillerSuspense,
        Self::YoungAdult,
        Self::ArtPhotography,
        Self::BiographyMemoir,
        Self::BusinessEconomics,
        Self::CookingFood,
        Self::HealthWellness,
        Self::History,
        Self::PoliticsSocialSciences,
        Self::ReligionSpirituality,
        Self::ScienceNature,
        Self::SelfHelp,
        Self::TravelAdventure,
        Self::ComputersTechnology,
        Self::Engineering,
        Self::Mathematics,
        Self::MedicalHealthSciences,
        Self::Psychology,
        Self::Reference,
        Self::StudyAids,
        Self::TestPreparation,
        Self::Textbooks,
        Self::ActivityBooks,
        Self::EarlyLearning,
        Self::PictureBooks,
        Self::ChapterBooks,
        Self::MiddleGrade,
        Self::Manga,
        Self::Superheroes,
        Self::Webcomics,
        Self::FantasySciFi,
        Self::Lgbtq,
        Self::Multicultural,
        Self::WomensFiction,
        Self::Poetry,
        Self::Drama,
        Self::Essays,
        Self::Anthologies,
    ];

    /// The storage / wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adventure => "adventure",
            Self::Classics => "classics",
            Self::Contemporary => "contemporary",
            Self::Fantasy => "fantasy",
            Self::HistoricalFiction => "historicalFiction",
            Self::Horror => "horror",
            Self::MysteryCrime => "mysteryCrime",
            Self::Romance => "romance",
            Self::ScienceFiction => "scienceFiction",
            Self::ThrillerSuspense => "thrillerSuspense",
            Self::YoungAdult => "youngAdult",
            Self::ArtPhotography => "artPhotography",
            Self::BiographyMemoir => "biographyMemoir",
            Self::BusinessEconomics => "businessEconomics",
            Self::CookingFood => "cookingFood",
            Self::HealthWellness => "healthWellness",
            Self::History => "history",
            Self::PoliticsSocialSciences => "politicsSocialSciences",
            Self::ReligionSpirituality => "religionSpirituality",
            Self::ScienceNature => "scienceNature",
            Self::SelfHelp => "selfHelp",
            Self::TravelAdventure => "travelAdventure",
            Self::ComputersTechnology => "computersTechnology",
            Self::Engineering => "engineering",
            Self::Mathematics => "mathematics",
            Self::MedicalHealthSciences => "medicalHealthSciences",
            Self::Psychology => "psychology",
            Self::Reference => "reference",
            Self::StudyAids => "studyAids",
            Self::TestPreparation => "testPreparation",
            Self::Textbooks => "textbooks",
            Self::ActivityBooks => "activityBooks",
            Self::EarlyLearning => "earlyLearning",
            Self::PictureBooks => "pictureBooks",
            Self::ChapterBooks => "chapterBooks",
            Self::MiddleGrade => "middleGrade",
            Self::Manga => "manga",
            Self::Superheroes => "superheroes",
            Self::Webcomics => "webcomics",
            Self::FantasySciFi => "fantasySciFi",
            Self::Lgbtq => "lgbtq",
            Self::Multicultural => "multicultural",
            Self::WomensFiction => "womensFiction",
            Self::Poetry => "poetry",
            Self::Drama => "drama",
            Self::Essays => "essays",
            Self::Anthologies => "anthologies",
        }
    }
}

impl std::fmt::Display for BookCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
