use std::fmt;

macro_rules! command_tags {
    ($($variant:ident => $wire:literal [$($key:literal),*]),* $(,)?) => {
        /// Every command (non-container) block tag the editor knows.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum CommandTag {
            $($variant,)*
        }

        impl CommandTag {
            pub const ALL: &'static [CommandTag] = &[$(CommandTag::$variant,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(CommandTag::$variant => $wire,)*
                }
            }

            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($wire => Some(CommandTag::$variant),)*
                    _ => None,
                }
            }

            /// Parameter keys a block of this tag may carry. Anything else is foreign.
            pub fn parameter_keys(self) -> &'static [&'static str] {
                match self {
                    $(CommandTag::$variant => &[$($key),*],)*
                }
            }
        }
    };
}

command_tags! {
    Say => "SAY" ["text"],
    Ask => "ASK" ["text"],
    Announce => "ANNOUNCE" ["text"],
    SayChar => "SAYCHAR" ["character", "text"],
    AskChar => "ASKCHAR" ["character", "text"],
    FocusChar => "FOCUSCHAR" ["character"],
    ShowDlgScene => "SHOWDLGSCENE" [],
    HideDlgScene => "HIDEDLGSCENE" [],
    SetFlightStatusBar => "SETFLIGHTSTATUSBAR" ["text"],
    ShowChar => "SHOWCHAR" ["character", "position", "image"],
    HideChar => "HIDECHAR" ["character"],
    ChangeChar => "CHANGECHAR" ["character", "image"],
    ShowCharacter => "SHOW_CHARACTER" ["character"],
    HideCharacter => "HIDE_CHARACTER" ["character"],
    ChangeCharacter => "CHANGE_CHARACTER" ["character", "image"],
    Set => "SET" ["semaphore"],
    Reset => "RESET" ["semaphore"],
    SetTo => "SET_TO" ["variable", "value"],
    Add => "ADD" ["variable", "value"],
    SetVariable => "SET_VARIABLE" ["variable"],
    ResetVariable => "RESET_VARIABLE" ["variable"],
    Label => "LABEL" ["name"],
    Go => "GO" ["label"],
    SubScript => "SUB_SCRIPT" ["script"],
    Return => "RETURN" [],
    ExitMenu => "EXIT_MENU" [],
    Delay => "DELAY" ["duration"],
    ShowPath => "SHOWPATH" ["route"],
    HidePath => "HIDEPATH" ["route"],
    HideAllPaths => "HIDEALLPATHS" ["node1", "node2"],
    ShowNode => "SHOWNODE" ["node"],
    HideNode => "HIDENODE" ["node"],
    AddNode => "ADDNODE" ["node"],
    SetNodeKnown => "SETNODEKNOWN" ["node"],
    CenterMapByNode => "CENTERMAPBYNODE" ["node"],
    CenterMapByPath => "CENTERMAPBYPATH" ["route"],
    MovePlayerToNode => "MOVEPLAYERTONODE" ["node"],
    ShowButton => "SHOWBUTTON" ["button"],
    HideButton => "HIDEBUTTON" ["button"],
    SetFocus => "SETFOCUS" ["button"],
    ResetFocus => "RESETFOCUS" ["button"],
    SetFocusIfCredits => "SETFOCUSIFCREDITS" ["button", "credits"],
    AddInfoWindow => "ADDINFOWINDOW" ["image"],
    ShowInfoWindow => "SHOWINFOWINDOW" ["image"],
    ShowHelpImage => "SHOWHELPIMAGE" ["params"],
    BuildingHelpScript => "BUILDINGHELPSCRIPT" ["value", "script"],
    FlightHelpScript => "FLIGHTHELPSCRIPT" ["script"],
    AlienHelpScript => "ALIENHELPSCRIPT" ["script"],
    ActMission => "ACT_MISSION" ["mission"],
    AddOpponent => "ADDOPPONENT" ["character"],
    SetShipType => "SETSHIPTYPE" ["type"],
    AddPartToShip => "ADDPARTTOSHIP" ["params"],
    AddPartToAsideSlot => "ADDPARTTOASIDESLOT" ["params"],
    AddShipParts => "ADDSHIPPARTS" ["params"],
    SetAdvPile => "SETADVPILE" ["params"],
    SetSecretAdvPile => "SETSECRETADVPILE" ["params"],
    SetDeckPreparationScript => "SETDECKPREPARATIONSCRIPT" ["script"],
    SetFlightDeckPreparationScript => "SETFLIGHTDECKPREPARATIONSCRIPT" ["script"],
    SetSpecCondition => "SETSPECCONDITION" ["condition"],
    SetTurnBased => "SETTURNBASED" [],
    SetMissionAsFailed => "SETMISSIONASFAILED" [],
    SetMissionAsCompleted => "SETMISSIONASCOMPLETED" [],
    AllShipsGiveUp => "ALLSHIPSGIVEUP" [],
    GiveUpFlight => "GIVEUPFLIGHT" [],
    ModifyOpponentsBuildSpeed => "MODIFYOPPONENTSBUILDSPEED" ["percentage"],
    FinishMission => "FINISH_MISSION" [],
    AddOpponentsCredits => "ADDOPPONENTSCREDITS" ["index", "credits"],
    AddCredits => "ADDCREDITS" ["amount"],
    SetCredits => "SETCREDITS" ["amount"],
    AddMissionCredits => "ADDMISSIONCREDITS" ["amount"],
    AddMissionCreditsByResult => "ADDMISSIONCREDITSBYRESULT" [],
    SubOpponentCreditsByResult => "SUBOPPONENTCREDITSBYRESULT" [],
    SetAchievementProgress => "SETACHIEVEMENTPROGRESS" ["achievement", "value"],
    SetAchievementAttempt => "SETACHIEVEMENTATTEMPT" ["achievement", "value"],
    UnlockAchievement => "UNLOCKACHIEVEMENT" ["achievement"],
    UnlockShipPlan => "UNLOCKSHIPPLAN" ["plan", "shipPlan"],
    UnlockShuttles => "UNLOCKSHUTTLES" [],
    DeckAddCardType => "DECKADDCARDTYPE" ["params"],
    DeckAddAllCards => "DECKADDALLCARDS" [],
    DeckAddCardRound => "DECKADDCARDROUND" ["params"],
    DeckAddRulePosition => "DECKADDRULEPOSITION" ["params"],
    DeckAddRuleRange => "DECKADDRULERANGE" ["params"],
    DeckShuffle => "DECKSHUFFLE" [],
    SetSuperCardsCnt => "SETSUPERCARDSCNT" ["params"],
    SaveState => "SAVESTATE" [],
    LoadState => "LOADSTATE" [],
    QuitCampaign => "QUITCAMPAIGN" [],
}

impl CommandTag {
    pub fn accepts_parameter(self, key: &str) -> bool {
        self.parameter_keys().contains(&key)
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
