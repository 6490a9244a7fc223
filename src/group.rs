//! Grouping engine.
//!
//! Splits a list of filenames into chaptered videos, burst groups, stereo pairs and single files.
//! The passes run in a fixed priority order and each one hands its unclaimed names to the next,
//! so a name is claimed by at most one group. Whatever is left over ends up in `residual`.

use std::collections::{BTreeMap, HashMap};

use itertools::{Either, Itertools};

use crate::pattern::{BurstFile, CameraFile, ChapterFile, SingleFile, StereoFile};

/// Chaptered videos keyed by file number.
pub type ChapterGroups = BTreeMap<String, Vec<ChapterFile>>;

/// Burst items keyed by burst number.
pub type BurstGroups = BTreeMap<String, Vec<BurstFile>>;

/// Stereo pairs keyed by file number.
pub type StereoGroups = BTreeMap<String, Vec<StereoFile>>;

/// Result of classifying one directory listing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Members ordered by chapter index, the implicit first segment at position 0.
    pub chapters: ChapterGroups,
    /// Members ordered by file number.
    pub bursts: BurstGroups,
    /// Left side before right side.
    pub stereo: StereoGroups,
    pub singles: Vec<SingleFile>,
    /// Names that match no known shape, in input order.
    pub residual: Vec<String>,
    /// Chapter groups with no `GOPR<zzzz>` first segment present.
    pub missing_first_chapter: Vec<String>,
}

/// A classified file together with its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedFile<'a> {
    Chapter(&'a ChapterFile),
    Burst(&'a BurstFile),
    Stereo(&'a StereoFile),
    Single(&'a SingleFile),
}

struct ChapterPass {
    groups: ChapterGroups,
    missing_first: Vec<String>,
    remaining: Vec<String>,
}

/// Classify filenames into groups.
///
/// ```rust
/// use gopro_rename::group::classify;
///
/// let result = classify(["GP011212.MP4", "GOPR1212.MP4", "notes.txt"]);
/// assert_eq!(result.chapters["1212"].len(), 2);
/// assert_eq!(result.residual, vec!["notes.txt"]);
/// ```
pub fn classify<I, S>(names: I) -> Classification
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();

    let ChapterPass {
        groups: chapters,
        missing_first,
        remaining,
    } = chapter_pass(names);
    let (bursts, remaining) = burst_pass(remaining);
    let (stereo, remaining) = stereo_pass(remaining);
    let (singles, residual) = single_pass(remaining);

    Classification {
        chapters,
        bursts,
        stereo,
        singles,
        residual,
        missing_first_chapter: missing_first,
    }
}

/// Bucket chapter continuations by file number and attach the matching first segment.
///
/// A `GOPR<zzzz>` file is taken as the first segment when its file number is a bucket key
/// and its extension equals the extension of that bucket, ignoring case.
/// Other `GOPR<zzzz>` files stay in the remaining list for the single pass.
fn chapter_pass(names: Vec<String>) -> ChapterPass {
    let (continuations, remaining): (Vec<ChapterFile>, Vec<String>) =
        names
            .into_iter()
            .partition_map(|name| match ChapterFile::parse_continuation(&name) {
                Some(file) => Either::Left(file),
                None => Either::Right(name),
            });

    let mut groups = bucket_by(continuations, |file| file.file_number.clone());
    for members in groups.values_mut() {
        members.sort_by(|a, b| a.chapter.cmp(&b.chapter));
    }

    let mut first_segments: HashMap<String, ChapterFile> = HashMap::new();
    let remaining: Vec<String> = remaining
        .into_iter()
        .filter_map(|name| {
            if let Some(single) = SingleFile::parse(&name)
                && !first_segments.contains_key(&single.file_number)
                && groups
                    .get(&single.file_number)
                    .and_then(|members| members.first())
                    .is_some_and(|member| member.extension.eq_ignore_ascii_case(&single.extension))
            {
                first_segments.insert(single.file_number.clone(), ChapterFile::first_segment(single));
                return None;
            }
            Some(name)
        })
        .collect();

    let mut missing_first = Vec::new();
    for (file_number, members) in &mut groups {
        match first_segments.remove(file_number) {
            Some(first) => members.insert(0, first),
            None => missing_first.push(file_number.clone()),
        }
    }

    ChapterPass {
        groups,
        missing_first,
        remaining,
    }
}

fn burst_pass(names: Vec<String>) -> (BurstGroups, Vec<String>) {
    let (items, remaining): (Vec<BurstFile>, Vec<String>) =
        names.into_iter().partition_map(|name| match BurstFile::parse(&name) {
            Some(file) => Either::Left(file),
            None => Either::Right(name),
        });

    let mut groups = bucket_by(items, |file| file.burst_number.clone());
    for members in groups.values_mut() {
        members.sort_by(|a, b| a.file_number.cmp(&b.file_number));
    }
    (groups, remaining)
}

fn stereo_pass(names: Vec<String>) -> (StereoGroups, Vec<String>) {
    let (items, remaining): (Vec<StereoFile>, Vec<String>) =
        names.into_iter().partition_map(|name| match StereoFile::parse(&name) {
            Some(file) => Either::Left(file),
            None => Either::Right(name),
        });

    let mut groups = bucket_by(items, |file| file.file_number.clone());
    for members in groups.values_mut() {
        members.sort_by_key(|file| file.direction);
    }
    (groups, remaining)
}

fn single_pass(names: Vec<String>) -> (Vec<SingleFile>, Vec<String>) {
    names.into_iter().partition_map(|name| match SingleFile::parse(&name) {
        Some(file) => Either::Left(file),
        None => Either::Right(name),
    })
}

/// Group items by key, keeping input order inside each bucket.
fn bucket_by<T>(items: Vec<T>, key: impl Fn(&T) -> String) -> BTreeMap<String, Vec<T>> {
    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

impl Classification {
    /// All classified files in naming order: chapters, bursts, stereo pairs, singles.
    #[must_use]
    pub fn files(&self) -> Vec<ClassifiedFile<'_>> {
        let chapters = self.chapters.values().flatten().map(ClassifiedFile::Chapter);
        let bursts = self.bursts.values().flatten().map(ClassifiedFile::Burst);
        let stereo = self.stereo.values().flatten().map(ClassifiedFile::Stereo);
        let singles = self.singles.iter().map(ClassifiedFile::Single);
        chapters.chain(bursts).chain(stereo).chain(singles).collect()
    }

    /// Number of classified files, residual excluded.
    #[must_use]
    pub fn classified_count(&self) -> usize {
        self.chapters.values().map(Vec::len).sum::<usize>()
            + self.bursts.values().map(Vec::len).sum::<usize>()
            + self.stereo.values().map(Vec::len).sum::<usize>()
            + self.singles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classified_count() == 0
    }

    /// Member names of a chapter group.
    #[must_use]
    pub fn chapter_names(&self, file_number: &str) -> Vec<&str> {
        member_names(self.chapters.get(file_number))
    }

    /// Member names of a burst group.
    #[must_use]
    pub fn burst_names(&self, burst_number: &str) -> Vec<&str> {
        member_names(self.bursts.get(burst_number))
    }

    /// Member names of a stereo pair.
    #[must_use]
    pub fn stereo_names(&self, file_number: &str) -> Vec<&str> {
        member_names(self.stereo.get(file_number))
    }

    #[must_use]
    pub fn single_names(&self) -> Vec<&str> {
        self.singles.iter().map(|file| file.name.as_str()).collect()
    }
}

fn member_names<T: CameraFile>(members: Option<&Vec<T>>) -> Vec<&str> {
    members.map_or_else(Vec::new, |members| members.iter().map(CameraFile::name).collect())
}

impl<'a> ClassifiedFile<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Chapter(file) => file.name(),
            Self::Burst(file) => file.name(),
            Self::Stereo(file) => file.name(),
            Self::Single(file) => file.name(),
        }
    }

    #[must_use]
    pub fn extension(&self) -> &'a str {
        match *self {
            Self::Chapter(file) => file.extension(),
            Self::Burst(file) => file.extension(),
            Self::Stereo(file) => file.extension(),
            Self::Single(file) => file.extension(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sample listing covering every shape.
    const SAMPLE_FILES: &[&str] = &[
        "GOPR1213.MP4",
        "GOPR1214.MP4",
        "GOPR1215.JPG",
        "GOPR1212.MP4",
        "GP011212.MP4",
        "GP021212.MP4",
        "GOPR1234.MP4",
        "GP011234.MP4",
        "GP021234.MP4",
        "GP031234.MP4",
        "G0231111.JPG",
        "G0231112.JPG",
        "G0241117.JPG",
        "3D_L0002.MP4",
        "3D_R0002.MP4",
        "3D_L1234.JPG",
        "3D_R1234.JPG",
        "left out 1",
        "1234",
        "GOPRO1234.JPG",
        "GO123.MP4",
    ];

    #[test]
    fn chaptered_video_with_first_segment() {
        let result = classify(["GOPR1212.MP4", "GP011212.MP4", "GP021212.MP4"]);
        assert_eq!(
            result.chapter_names("1212"),
            vec!["GOPR1212.MP4", "GP011212.MP4", "GP021212.MP4"]
        );
        assert_eq!(result.chapters.len(), 1);
        assert!(result.residual.is_empty());
        assert!(result.singles.is_empty());
        assert!(result.missing_first_chapter.is_empty());
    }

    #[test]
    fn chapters_sorted_regardless_of_input_order() {
        let result = classify(["GP031234.MP4", "GP011234.MP4", "GOPR1234.MP4", "GP021234.MP4"]);
        assert_eq!(
            result.chapter_names("1234"),
            vec!["GOPR1234.MP4", "GP011234.MP4", "GP021234.MP4", "GP031234.MP4"]
        );
        let chapters: Vec<&str> = result.chapters["1234"].iter().map(|file| file.chapter.as_str()).collect();
        assert_eq!(chapters, vec!["00", "01", "02", "03"]);
    }

    #[test]
    fn chapter_group_without_first_segment() {
        let result = classify(["GP021238.MP4", "GP011238.MP4"]);
        assert_eq!(result.chapter_names("1238"), vec!["GP011238.MP4", "GP021238.MP4"]);
        assert_eq!(result.missing_first_chapter, vec!["1238"]);
    }

    #[test]
    fn first_segment_matches_extension_ignoring_case() {
        let result = classify(["GOPR1212.mp4", "GP011212.MP4"]);
        assert_eq!(result.chapter_names("1212"), vec!["GOPR1212.mp4", "GP011212.MP4"]);
        assert!(result.singles.is_empty());
    }

    #[test]
    fn first_segment_with_other_extension_stays_single() {
        let result = classify(["GOPR1212.JPG", "GP011212.MP4"]);
        assert_eq!(result.chapter_names("1212"), vec!["GP011212.MP4"]);
        assert_eq!(result.single_names(), vec!["GOPR1212.JPG"]);
        assert_eq!(result.missing_first_chapter, vec!["1212"]);
    }

    #[test]
    fn burst_group() {
        let result = classify(["G0231112.JPG", "G0231111.JPG"]);
        assert_eq!(result.burst_names("023"), vec!["G0231111.JPG", "G0231112.JPG"]);
        assert!(result.residual.is_empty());
    }

    #[test]
    fn multiple_burst_groups() {
        let result = classify(["G0241118.JPG", "G0231111.JPG", "G0241117.JPG"]);
        assert_eq!(result.bursts.len(), 2);
        assert_eq!(result.burst_names("023"), vec!["G0231111.JPG"]);
        assert_eq!(result.burst_names("024"), vec!["G0241117.JPG", "G0241118.JPG"]);
    }

    #[test]
    fn stereo_pair_left_before_right() {
        let result = classify(["3D_R0002.MP4", "3D_L0002.MP4"]);
        assert_eq!(result.stereo_names("0002"), vec!["3D_L0002.MP4", "3D_R0002.MP4"]);
    }

    #[test]
    fn stereo_single_side() {
        let result = classify(["3D_R0005.MP4"]);
        assert_eq!(result.stereo_names("0005"), vec!["3D_R0005.MP4"]);
    }

    #[test]
    fn unrecognized_names_are_residual() {
        let input = ["left out 1", "1234", "GOPRO1234.JPG", "GO123.MP4"];
        let result = classify(input);
        assert_eq!(result.residual, input.to_vec());
        assert!(result.is_empty());
        assert!(result.chapters.is_empty());
        assert!(result.bursts.is_empty());
        assert!(result.stereo.is_empty());
    }

    #[test]
    fn lone_first_segment_is_single() {
        let result = classify(["GOPR1215.JPG"]);
        assert_eq!(result.single_names(), vec!["GOPR1215.JPG"]);
        assert!(result.chapters.is_empty());
    }

    #[test]
    fn singles_keep_input_order() {
        let result = classify(["GOPR1219.JPG", "GOPR1213.MP4", "GOPR1216.MP4"]);
        assert_eq!(result.single_names(), vec!["GOPR1219.JPG", "GOPR1213.MP4", "GOPR1216.MP4"]);
    }

    #[test]
    fn every_name_is_claimed_exactly_once() {
        let result = classify(SAMPLE_FILES.iter().copied());
        assert_eq!(result.classified_count() + result.residual.len(), SAMPLE_FILES.len());

        let mut seen: Vec<&str> = result.files().iter().map(ClassifiedFile::name).collect();
        seen.extend(result.residual.iter().map(String::as_str));
        seen.sort_unstable();
        let mut expected = SAMPLE_FILES.to_vec();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn sample_listing_groups() {
        let result = classify(SAMPLE_FILES.iter().copied());
        assert_eq!(result.chapters.len(), 2);
        assert_eq!(result.chapter_names("1234").len(), 4);
        assert_eq!(result.bursts.len(), 2);
        assert_eq!(result.stereo.len(), 2);
        assert_eq!(result.stereo_names("1234"), vec!["3D_L1234.JPG", "3D_R1234.JPG"]);
        assert_eq!(result.single_names(), vec!["GOPR1213.MP4", "GOPR1214.MP4", "GOPR1215.JPG"]);
        assert_eq!(result.residual, vec!["left out 1", "1234", "GOPRO1234.JPG", "GO123.MP4"]);
    }

    #[test]
    fn classifying_residual_again_is_stable() {
        let first = classify(SAMPLE_FILES.iter().copied());
        let second = classify(first.residual.clone());
        assert_eq!(second.residual, first.residual);
        assert!(second.is_empty());
    }

    #[test]
    fn files_are_listed_in_group_order() {
        let result = classify(["GOPR0001.MP4", "3D_L0002.MP4", "G0010003.JPG", "GP010004.MP4"]);
        let names: Vec<&str> = result.files().iter().map(ClassifiedFile::name).collect();
        assert_eq!(names, vec!["GP010004.MP4", "G0010003.JPG", "3D_L0002.MP4", "GOPR0001.MP4"]);
    }

    #[test]
    fn empty_input() {
        let result = classify(Vec::<String>::new());
        assert_eq!(result, Classification::default());
    }
}
