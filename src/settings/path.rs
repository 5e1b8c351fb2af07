use std::fmt;
use std::str::FromStr;

use super::error::SettingsError;

/// How a view reacts to a changed setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingEffect {
	/// Derive the view graph again and compare it with the bound one.
	Recompute,
	/// Run the search again; the graph follows once results arrive.
	Search,
	/// Recompile group queries and recolor.
	Regroup,
	/// Visual attributes only; the simulation is untouched.
	Restyle,
	/// Layout forces changed; the simulation is reheated.
	Forces,
}

/// Every setting a view reacts to, keyed by its dotted path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingPath {
	FilterSearchQuery,
	FilterShowOrphans,
	FilterShowAttachments,
	FilterDepth,
	FilterLinkType,
	Groups,
	DisplayNodeSize,
	DisplayLinkThickness,
	DisplayLinkDistance,
	DisplayNodeRepulsion,
	DisplayNodeHoverColor,
	DisplayNodeHoverNeighbourColor,
	DisplayLinkHoverColor,
	DisplayShowExtension,
	DisplayShowFullPath,
	DisplayShowCenterCoordinates,
	DisplayShowLinkArrow,
	DisplayDontMoveWhenDrag,
	DisplayDagOrientation,
	MaxNodeNumber,
}

impl SettingPath {
	pub const ALL: [SettingPath; 20] = [
		SettingPath::FilterSearchQuery,
		SettingPath::FilterShowOrphans,
		SettingPath::FilterShowAttachments,
		SettingPath::FilterDepth,
		SettingPath::FilterLinkType,
		SettingPath::Groups,
		SettingPath::DisplayNodeSize,
		SettingPath::DisplayLinkThickness,
		SettingPath::DisplayLinkDistance,
		SettingPath::DisplayNodeRepulsion,
		SettingPath::DisplayNodeHoverColor,
		SettingPath::DisplayNodeHoverNeighbourColor,
		SettingPath::DisplayLinkHoverColor,
		SettingPath::DisplayShowExtension,
		SettingPath::DisplayShowFullPath,
		SettingPath::DisplayShowCenterCoordinates,
		SettingPath::DisplayShowLinkArrow,
		SettingPath::DisplayDontMoveWhenDrag,
		SettingPath::DisplayDagOrientation,
		SettingPath::MaxNodeNumber,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			SettingPath::FilterSearchQuery => "filter.searchQuery",
			SettingPath::FilterShowOrphans => "filter.showOrphans",
			SettingPath::FilterShowAttachments => "filter.showAttachments",
			SettingPath::FilterDepth => "filter.depth",
			SettingPath::FilterLinkType => "filter.linkType",
			SettingPath::Groups => "groups",
			SettingPath::DisplayNodeSize => "display.nodeSize",
			SettingPath::DisplayLinkThickness => "display.linkThickness",
			SettingPath::DisplayLinkDistance => "display.linkDistance",
			SettingPath::DisplayNodeRepulsion => "display.nodeRepulsion",
			SettingPath::DisplayNodeHoverColor => "display.nodeHoverColor",
			SettingPath::DisplayNodeHoverNeighbourColor => "display.nodeHoverNeighbourColor",
			SettingPath::DisplayLinkHoverColor => "display.linkHoverColor",
			SettingPath::DisplayShowExtension => "display.showExtension",
			SettingPath::DisplayShowFullPath => "display.showFullPath",
			SettingPath::DisplayShowCenterCoordinates => "display.showCenterCoordinates",
			SettingPath::DisplayShowLinkArrow => "display.showLinkArrow",
			SettingPath::DisplayDontMoveWhenDrag => "display.dontMoveWhenDrag",
			SettingPath::DisplayDagOrientation => "display.dagOrientation",
			SettingPath::MaxNodeNumber => "pluginSetting.maxNodeNumber",
		}
	}

	pub fn effect(self) -> SettingEffect {
		match self {
			SettingPath::FilterSearchQuery => SettingEffect::Search,
			SettingPath::FilterShowOrphans
			| SettingPath::FilterShowAttachments
			| SettingPath::FilterDepth
			| SettingPath::FilterLinkType
			| SettingPath::MaxNodeNumber => SettingEffect::Recompute,
			SettingPath::Groups => SettingEffect::Regroup,
			SettingPath::DisplayLinkDistance
			| SettingPath::DisplayNodeRepulsion
			| SettingPath::DisplayDagOrientation => SettingEffect::Forces,
			SettingPath::DisplayNodeSize
			| SettingPath::DisplayLinkThickness
			| SettingPath::DisplayNodeHoverColor
			| SettingPath::DisplayNodeHoverNeighbourColor
			| SettingPath::DisplayLinkHoverColor
			| SettingPath::DisplayShowExtension
			| SettingPath::DisplayShowFullPath
			| SettingPath::DisplayShowCenterCoordinates
			| SettingPath::DisplayShowLinkArrow
			| SettingPath::DisplayDontMoveWhenDrag => SettingEffect::Restyle,
		}
	}
}

impl fmt::Display for SettingPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SettingPath {
	type Err = SettingsError;

	/// Group paths may carry an index (`groups.2.query`); they all map to
	/// [`SettingPath::Groups`].
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s == "groups" || s.starts_with("groups.") {
			return Ok(SettingPath::Groups);
		}
		SettingPath::ALL
			.into_iter()
			.find(|p| p.as_str() == s)
			.ok_or_else(|| SettingsError::UnknownPath(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_path_parses_back() {
		for path in SettingPath::ALL {
			assert_eq!(path.as_str().parse::<SettingPath>().unwrap(), path);
		}
	}

	#[test]
	fn indexed_group_paths_map_to_groups() {
		assert_eq!(
			"groups.3.color".parse::<SettingPath>().unwrap(),
			SettingPath::Groups
		);
	}

	#[test]
	fn unknown_path_is_an_error() {
		assert!(matches!(
			"display.bloom".parse::<SettingPath>(),
			Err(SettingsError::UnknownPath(p)) if p == "display.bloom"
		));
	}

	#[test]
	fn effects_follow_the_setting_kind() {
		assert_eq!(SettingPath::FilterSearchQuery.effect(), SettingEffect::Search);
		assert_eq!(SettingPath::FilterShowOrphans.effect(), SettingEffect::Recompute);
		assert_eq!(SettingPath::DisplayNodeSize.effect(), SettingEffect::Restyle);
		assert_eq!(SettingPath::DisplayLinkDistance.effect(), SettingEffect::Forces);
		assert_eq!(SettingPath::Groups.effect(), SettingEffect::Regroup);
	}
}
