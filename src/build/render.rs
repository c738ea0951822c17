//! Merged build output and the renderers for each generated file.
//!
//! [`ConfigBuild`] is what `ZmkConfig::build_config` returns. The render
//! methods only produce text; writing files is left to the caller.

use super::fragment::{BoardFragment, KscanFragment, RequiresFragment};
use crate::error::Result;
use crate::transform::RowCol;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Includes and per-key bindings of the default layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapSection {
    /// Header files, in first-seen order
    pub include: Vec<String>,
    /// One binding per key index (`&kp A`, `&mo 1`, ...)
    pub bindings: Vec<String>,
}

/// Every fragment of a configuration, merged per destination file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBuild {
    /// Shield id (file stem of every generated file)
    pub id: String,
    /// Human readable keyboard name
    pub name: String,
    /// Whether the keyboard is split into two halves
    pub split: bool,
    /// `.keymap` content
    pub keymap: KeymapSection,
    /// Lines of `<id>.conf`
    pub conf: Vec<String>,
    /// Lines rendered into `Kconfig.defconfig`
    pub defconfig: Vec<String>,
    /// Lines of the central half's conf file
    pub central_conf: Vec<String>,
    /// Lines of the peripheral half's conf file
    pub peripheral_conf: Vec<String>,
    /// Board selection for `build.yaml`
    pub build_yaml: Option<BoardFragment>,
    /// Requirement for `<id>.zmk.yml`
    pub keyboard_zmk_yml: Option<RequiresFragment>,
    /// Kscan node for `<id>.overlay`
    pub overlay: Option<KscanFragment>,
    /// Matrix transform map in key index order
    pub matrix_transform: Vec<RowCol>,
}

#[derive(Serialize)]
struct BuildYaml<'a> {
    include: Vec<BuildTarget<'a>>,
}

#[derive(Serialize)]
struct BuildTarget<'a> {
    board: &'a str,
    shield: String,
}

#[derive(Serialize)]
struct ShieldMetadata<'a> {
    file_format: &'static str,
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    requires: Vec<&'a str>,
    features: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    siblings: Vec<String>,
}

impl ConfigBuild {
    /// Shield names a build targets: `<id>` or `<id>_left` / `<id>_right`.
    #[must_use]
    pub fn shield_names(&self) -> Vec<String> {
        if self.split {
            vec![format!("{}_left", self.id), format!("{}_right", self.id)]
        } else {
            vec![self.id.clone()]
        }
    }

    /// Renders the `.keymap` devicetree file.
    ///
    /// When the transform covers every binding, a new line starts wherever
    /// the matrix row changes.
    #[must_use]
    pub fn render_keymap(&self) -> String {
        let mut out = String::new();
        for include in &self.keymap.include {
            let _ = writeln!(out, "#include <{include}>");
        }
        out.push_str("\n/ {\n    keymap {\n        compatible = \"zmk,keymap\";\n\n");
        out.push_str("        default_layer {\n            bindings = <\n");
        for row in self.binding_rows() {
            let _ = writeln!(out, "                {}", row.join(" "));
        }
        out.push_str("            >;\n        };\n    };\n};\n");
        out
    }

    fn binding_rows(&self) -> Vec<Vec<&str>> {
        let mut rows: Vec<Vec<&str>> = Vec::new();
        let by_row = self.matrix_transform.len() == self.keymap.bindings.len();
        let mut current_row = None;
        for (index, binding) in self.keymap.bindings.iter().enumerate() {
            let row = by_row.then(|| self.matrix_transform[index].row);
            if rows.is_empty() || (by_row && row != current_row) {
                rows.push(Vec::new());
            }
            current_row = row;
            if let Some(last) = rows.last_mut() {
                last.push(binding);
            }
        }
        rows
    }

    /// Renders `.conf` lines, one per line.
    #[must_use]
    pub fn render_conf(lines: &[String]) -> String {
        lines.iter().fold(String::new(), |mut out, line| {
            let _ = writeln!(out, "{line}");
            out
        })
    }

    /// Renders `Kconfig.defconfig` from the default option lines.
    #[must_use]
    pub fn render_defconfig(&self) -> String {
        let condition = self
            .shield_names()
            .iter()
            .map(|shield| format!("SHIELD_{}", shield.to_uppercase()))
            .collect::<Vec<_>>()
            .join(" || ");

        let mut out = format!("if {condition}\n");
        for line in &self.defconfig {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.strip_prefix("CONFIG_").unwrap_or(key);
            let _ = write!(out, "\nconfig {key}\n\tdefault {value}\n");
        }
        out.push_str("\nendif\n");
        out
    }

    /// Renders `build.yaml` with one entry per shield half.
    pub fn render_build_yaml(&self) -> Result<String> {
        let board = self
            .build_yaml
            .as_ref()
            .map_or("", |fragment| fragment.board.as_str());
        let yaml = BuildYaml {
            include: self
                .shield_names()
                .into_iter()
                .map(|shield| BuildTarget { board, shield })
                .collect(),
        };
        Ok(serde_yml::to_string(&yaml)?)
    }

    /// Renders the `<id>.zmk.yml` shield metadata file.
    pub fn render_zmk_yml(&self) -> Result<String> {
        let metadata = ShieldMetadata {
            file_format: "1",
            id: &self.id,
            name: &self.name,
            kind: "shield",
            requires: self
                .keyboard_zmk_yml
                .iter()
                .map(|fragment| fragment.requires.as_str())
                .collect(),
            features: vec!["keys"],
            siblings: if self.split {
                self.shield_names()
            } else {
                Vec::new()
            },
        };
        Ok(serde_yml::to_string(&metadata)?)
    }

    /// Renders the `.overlay` file with the kscan node and the transform.
    #[must_use]
    pub fn render_overlay(&self) -> String {
        let mut out = String::from("#include <dt-bindings/zmk/matrix_transform.h>\n\n/ {\n");
        out.push_str("    chosen {\n");
        if self.overlay.is_some() {
            out.push_str("        zmk,kscan = &kscan0;\n");
        }
        out.push_str("        zmk,matrix_transform = &default_transform;\n    };\n");

        if let Some(kscan) = &self.overlay {
            out.push_str("\n    kscan0: kscan {\n");
            let _ = writeln!(out, "        compatible = \"{}\";", kscan.compatible);
            let _ = writeln!(out, "        diode-direction = \"{}\";", kscan.diode_direction);
            write_gpio_list(&mut out, "row-gpios", &kscan.row_gpios);
            write_gpio_list(&mut out, "col-gpios", &kscan.col_gpios);
            out.push_str("    };\n");
        }

        let rows = self.matrix_transform.iter().map(|key| key.row + 1).max().unwrap_or(0);
        let columns = self.matrix_transform.iter().map(|key| key.col + 1).max().unwrap_or(0);
        out.push_str("\n    default_transform: keymap_transform_0 {\n");
        out.push_str("        compatible = \"zmk,matrix-transform\";\n");
        let _ = writeln!(out, "        columns = <{columns}>;");
        let _ = writeln!(out, "        rows = <{rows}>;");
        out.push_str("        map = <\n");
        let map = self
            .matrix_transform
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        if !map.is_empty() {
            let _ = writeln!(out, "            {map}");
        }
        out.push_str("        >;\n    };\n};\n");
        out
    }

    /// Every generated file as `(relative path, contents)`.
    pub fn files(&self) -> Result<Vec<(String, String)>> {
        let id = &self.id;
        let mut files = vec![
            (format!("{id}.keymap"), self.render_keymap()),
            (format!("{id}.conf"), Self::render_conf(&self.conf)),
            (format!("{id}.overlay"), self.render_overlay()),
            ("Kconfig.defconfig".to_string(), self.render_defconfig()),
            (format!("{id}.zmk.yml"), self.render_zmk_yml()?),
            ("build.yaml".to_string(), self.render_build_yaml()?),
        ];
        if self.split {
            files.push((format!("{id}_left.conf"), Self::render_conf(&self.central_conf)));
            files.push((
                format!("{id}_right.conf"),
                Self::render_conf(&self.peripheral_conf),
            ));
        }
        Ok(files)
    }
}

fn write_gpio_list(out: &mut String, property: &str, gpios: &[String]) {
    let _ = writeln!(out, "        {property}");
    for (index, gpio) in gpios.iter().enumerate() {
        let separator = if index == 0 { '=' } else { ',' };
        let _ = writeln!(out, "            {separator} {gpio}");
    }
    out.push_str("            ;\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_build() -> ConfigBuild {
        ConfigBuild {
            id: "test_board".to_string(),
            name: "Test Board".to_string(),
            split: false,
            keymap: KeymapSection {
                include: vec!["behaviors.dtsi".to_string(), "dt-bindings/zmk/keys.h".to_string()],
                bindings: vec![
                    "&kp A".to_string(),
                    "&kp B".to_string(),
                    "&mo 1".to_string(),
                ],
            },
            conf: vec!["CONFIG_ZMK_HID_CONSUMER_REPORT_SIZE=2".to_string()],
            defconfig: vec!["CONFIG_ZMK_KEYBOARD_NAME=\"Test Board\"".to_string()],
            build_yaml: Some(BoardFragment {
                board: "nice_nano_v2".to_string(),
            }),
            keyboard_zmk_yml: Some(RequiresFragment {
                requires: "nice_nano_v2".to_string(),
            }),
            matrix_transform: vec![RowCol::new(0, 0), RowCol::new(0, 1), RowCol::new(1, 0)],
            ..ConfigBuild::default()
        }
    }

    #[test]
    fn test_render_keymap_groups_by_row() {
        let keymap = sample_build().render_keymap();
        assert!(keymap.starts_with("#include <behaviors.dtsi>\n#include <dt-bindings/zmk/keys.h>\n"));
        assert!(keymap.contains("                &kp A &kp B\n                &mo 1\n"));
        assert!(keymap.contains("compatible = \"zmk,keymap\";"));
    }

    #[test]
    fn test_render_keymap_single_line_without_transform() {
        let mut build = sample_build();
        build.matrix_transform.clear();
        assert!(build.render_keymap().contains("                &kp A &kp B &mo 1\n"));
    }

    #[test]
    fn test_render_defconfig() {
        let defconfig = sample_build().render_defconfig();
        assert!(defconfig.starts_with("if SHIELD_TEST_BOARD\n"));
        assert!(defconfig.contains("config ZMK_KEYBOARD_NAME\n\tdefault \"Test Board\"\n"));
        assert!(defconfig.ends_with("endif\n"));
    }

    #[test]
    fn test_render_build_yaml_split() {
        let mut build = sample_build();
        build.split = true;
        let yaml = build.render_build_yaml().unwrap();
        let parsed: serde_json::Value = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed["include"][0]["board"], "nice_nano_v2");
        assert_eq!(parsed["include"][0]["shield"], "test_board_left");
        assert_eq!(parsed["include"][1]["shield"], "test_board_right");
    }

    #[test]
    fn test_render_zmk_yml() {
        let yaml = sample_build().render_zmk_yml().unwrap();
        let parsed: serde_json::Value = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed["id"], "test_board");
        assert_eq!(parsed["type"], "shield");
        assert_eq!(parsed["requires"][0], "nice_nano_v2");
        assert!(parsed.get("siblings").is_none());
    }

    #[test]
    fn test_render_overlay_transform() {
        let overlay = sample_build().render_overlay();
        assert!(overlay.contains("columns = <2>;"));
        assert!(overlay.contains("rows = <2>;"));
        assert!(overlay.contains("RC(0,0) RC(0,1) RC(1,0)"));
        assert!(!overlay.contains("kscan0"));
    }

    #[test]
    fn test_render_overlay_kscan() {
        let mut build = sample_build();
        build.overlay = Some(KscanFragment {
            compatible: "zmk,kscan-gpio-matrix".to_string(),
            diode_direction: "col2row".to_string(),
            row_gpios: vec!["<&pro_micro 4 (GPIO_ACTIVE_HIGH | GPIO_PULL_DOWN)>".to_string()],
            col_gpios: vec!["<&pro_micro 5 GPIO_ACTIVE_HIGH>".to_string()],
        });
        let overlay = build.render_overlay();
        assert!(overlay.contains("zmk,kscan = &kscan0;"));
        assert!(overlay.contains("= <&pro_micro 4 (GPIO_ACTIVE_HIGH | GPIO_PULL_DOWN)>"));
    }

    #[test]
    fn test_files_include_halves_when_split() {
        let mut build = sample_build();
        assert_eq!(build.files().unwrap().len(), 6);

        build.split = true;
        let names: Vec<String> = build.files().unwrap().into_iter().map(|(n, _)| n).collect();
        assert!(names.contains(&"test_board_left.conf".to_string()));
        assert!(names.contains(&"test_board_right.conf".to_string()));
    }
}
